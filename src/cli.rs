use clap::{Parser, Subcommand};

/// content-api: command-line access to the content repository API.
#[derive(Parser, Debug)]
#[command(name = "content-api", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Base URL of the content API (falls back to CONTENT_API_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Rewrite web_url fields on this origin to relative paths
    #[arg(long, global = true)]
    pub web_urls_relative_to: Option<String>,

    /// Exclusive upper bound on batched request URL length
    #[arg(long, default_value_t = content_api::DEFAULT_MAX_URL_LENGTH, global = true)]
    pub max_url_length: usize,

    /// Print one compact JSON document per line instead of pretty output
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a single artefact by slug
    Artefact(ArtefactArgs),

    /// List sections
    Sections(SectionsArgs),

    /// Fetch a single tag
    Tag(TagArgs),

    /// List artefacts carrying a tag
    WithTag(WithTagArgs),

    /// Fetch business support schemes by identifier, batching long lists
    BusinessSupportSchemes(IdsArgs),

    /// Fetch licences by identifier
    Licences(IdsArgs),
}

#[derive(Parser, Debug)]
pub struct ArtefactArgs {
    /// Artefact slug (e.g. vat-rates)
    pub slug: String,

    /// Edition number; requires CONTENT_API_BEARER_TOKEN
    #[arg(long)]
    pub edition: Option<u32>,

    /// Local authority SNAC code
    #[arg(long)]
    pub snac: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SectionsArgs {
    /// Only top-level sections
    #[arg(long)]
    pub root: bool,

    /// Only sections under this parent tag
    #[arg(long, conflicts_with = "root")]
    pub parent: Option<String>,
}

#[derive(Parser, Debug)]
pub struct TagArgs {
    pub tag: String,
}

#[derive(Parser, Debug)]
pub struct WithTagArgs {
    pub tag: String,

    /// Follow next-page links and print every item
    #[arg(long)]
    pub all_pages: bool,
}

#[derive(Parser, Debug)]
pub struct IdsArgs {
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_tag_all_pages() {
        let cli = Cli::parse_from(["content-api", "with-tag", "crime", "--all-pages"]);
        match cli.command {
            Command::WithTag(args) => {
                assert_eq!(args.tag, "crime");
                assert!(args.all_pages);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.max_url_length, 2000);
        assert!(!cli.compact);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "content-api",
            "business-support-schemes",
            "1",
            "2",
            "--max-url-length",
            "300",
            "--endpoint",
            "http://localhost:3000",
        ]);
        assert_eq!(cli.max_url_length, 300);
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:3000"));
        match cli.command {
            Command::BusinessSupportSchemes(args) => assert_eq!(args.ids, ["1", "2"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ids_are_required() {
        assert!(Cli::try_parse_from(["content-api", "licences"]).is_err());
    }

    #[test]
    fn test_root_conflicts_with_parent() {
        assert!(
            Cli::try_parse_from(["content-api", "sections", "--root", "--parent", "crime"])
                .is_err()
        );
    }
}
