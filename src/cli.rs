use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "keywallet", version, about = "Terminal client for the API key wallet")]
pub struct Args {
    /// Wallet server URL (e.g., "https://wallet.example.com")
    #[arg(short, long)]
    pub server: Option<String>,

    /// Only show one category; 0 shows the uncategorized keys
    #[arg(short, long)]
    pub category: Option<u64>,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_optional() {
        let args = Args::try_parse_from(["keywallet"]).unwrap();
        assert!(args.server.is_none());
        assert!(args.category.is_none());
    }

    #[test]
    fn category_zero_is_accepted() {
        let args =
            Args::try_parse_from(["keywallet", "--category", "0", "-s", "http://localhost:5000"])
                .unwrap();
        assert_eq!(args.category, Some(0));
        assert_eq!(args.server.as_deref(), Some("http://localhost:5000"));
    }
}
