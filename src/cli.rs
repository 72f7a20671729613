use std::path::PathBuf;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelsArg {
    Short,
    Long,
}

#[derive(clap::Parser, Debug)]
#[command(about = "Statusline with usage-limit pace projection")]
pub struct Args {
    /// Force Claude data path(s), comma-separated. Defaults to ~/.claude and ~/.config/claude
    #[arg(long, env = "CLAUDE_CONFIG_DIR")]
    pub claude_config_dir: Option<String>,

    /// Emit JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Label verbosity for text output: short|long
    #[arg(long, value_enum, default_value_t = LabelsArg::Short)]
    pub labels: LabelsArg,

    /// Width of each progress bar, in glyphs (1-200)
    #[arg(
        long,
        env = "CLAUDE_STATUSLINE_BAR_WIDTH",
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..=200)
    )]
    pub bar_width: u16,

    /// Where the last usage response is cached. Defaults to ~/.claude/statusline-usage.cache
    #[arg(long, env = "CLAUDE_STATUSLINE_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Disable ANSI colors (NO_COLOR is honored as well)
    #[arg(long)]
    pub no_color: bool,

    /// Debug mode: log cache/fetch decisions to stderr
    #[arg(long, env = "CLAUDE_DEBUG")]
    pub debug: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as clap::Parser>::parse()
    }

    pub fn color_enabled(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults() {
        unsafe {
            std::env::remove_var("CLAUDE_STATUSLINE_BAR_WIDTH");
            std::env::remove_var("CLAUDE_STATUSLINE_CACHE_FILE");
            std::env::remove_var("CLAUDE_DEBUG");
        }
        let args = Args::try_parse_from(["pace_statusline"]).unwrap();
        assert_eq!(args.bar_width, 10);
        assert_eq!(args.labels, LabelsArg::Short);
        assert!(!args.json);
        assert!(args.cache_file.is_none());
    }

    #[test]
    #[serial]
    fn flags() {
        let args = Args::try_parse_from([
            "pace_statusline",
            "--json",
            "--labels",
            "long",
            "--bar-width",
            "20",
            "--cache-file",
            "/tmp/usage.cache",
            "--no-color",
        ])
        .unwrap();
        assert!(args.json);
        assert_eq!(args.labels, LabelsArg::Long);
        assert_eq!(args.bar_width, 20);
        assert_eq!(args.cache_file, Some(PathBuf::from("/tmp/usage.cache")));
        assert!(!args.color_enabled());
    }

    #[test]
    #[serial]
    fn bar_width_is_bounded() {
        unsafe { std::env::remove_var("CLAUDE_STATUSLINE_BAR_WIDTH") };
        for bad in ["0", "201", "99999999999999999999", "-3"] {
            assert!(
                Args::try_parse_from(["pace_statusline", "--bar-width", bad]).is_err(),
                "accepted {bad}"
            );
        }
        let args = Args::try_parse_from(["pace_statusline", "--bar-width", "200"]).unwrap();
        assert_eq!(args.bar_width, 200);
    }
}
