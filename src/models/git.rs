use serde::Serialize;

#[derive(Default, Debug, Clone, Serialize)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub short_commit: Option<String>,
    pub is_clean: Option<bool>,
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
}
