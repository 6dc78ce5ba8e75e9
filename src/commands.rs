use std::io::Write;

use content_api::{ArtefactParams, ContentApi, ContentApiConfig, ListResponse, Response};
use futures_util::TryStreamExt;
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::write_json;

/// Environment fallbacks read after `.env` has been loaded.
pub struct Env {
    pub endpoint: Option<String>,
    pub bearer_token: Option<String>,
    pub role: Option<String>,
}

impl Env {
    pub fn load() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            endpoint: var("CONTENT_API_ENDPOINT"),
            bearer_token: var("CONTENT_API_BEARER_TOKEN"),
            role: var("CONTENT_API_ROLE"),
        }
    }
}

/// Merge command-line flags with the environment into a client config.
pub fn build_config(cli: &Cli, env: Env) -> Result<ContentApiConfig, CliError> {
    let endpoint = cli
        .endpoint
        .clone()
        .or(env.endpoint)
        .ok_or(CliError::MissingEndpoint)?;

    let mut config = ContentApiConfig::new(&endpoint);
    config.bearer_token = env.bearer_token;
    config.role = env.role;
    config.web_urls_relative_to = cli.web_urls_relative_to.clone();
    config.max_url_length = cli.max_url_length;
    Ok(config)
}

/// Execute the selected subcommand, writing results to `out`.
pub async fn run<W: Write>(cli: &Cli, api: &ContentApi, out: &mut W) -> Result<(), CliError> {
    let compact = cli.compact;

    match &cli.command {
        Command::Artefact(args) => {
            let params = ArtefactParams {
                edition: args.edition,
                snac: args.snac.clone(),
            };
            let found = api.artefact(&args.slug, &params).await?;
            print_found(found, "artefact", &args.slug, compact, out)
        }

        Command::Sections(args) => {
            let list = match (&args.parent, args.root) {
                (Some(parent), _) => api.sub_sections(parent).await?,
                (None, true) => api.root_sections().await?,
                (None, false) => api.sections().await?,
            };
            print_list(&list, compact, out)
        }

        Command::Tag(args) => {
            let found = api.tag(&args.tag).await?;
            print_found(found, "tag", &args.tag, compact, out)
        }

        Command::WithTag(args) => {
            let list = api.with_tag(&args.tag).await?;
            if !args.all_pages {
                return print_list(&list, compact, out);
            }

            let mut items = Box::pin(list.with_each_item(api));
            let mut count = 0usize;
            while let Some(item) = items.try_next().await? {
                write_json(&item, compact, out)?;
                count += 1;
            }
            info!(tag = %args.tag, count, "printed every page");
            Ok(())
        }

        Command::BusinessSupportSchemes(args) => {
            let list = api.business_support_schemes(&args.ids).await?;
            debug!(total = list.total(), "merged business support schemes");
            print_list(&list, compact, out)
        }

        Command::Licences(args) => {
            let found = api.licences_for_ids(&args.ids).await?;
            print_found(found, "licences", &args.ids.join(","), compact, out)
        }
    }
}

fn print_list<W: Write>(list: &ListResponse, compact: bool, out: &mut W) -> Result<(), CliError> {
    write_json(list.response().as_value(), compact, out)
}

fn print_found<W: Write>(
    found: Option<Response>,
    kind: &str,
    key: &str,
    compact: bool,
    out: &mut W,
) -> Result<(), CliError> {
    match found {
        Some(response) => write_json(response.as_value(), compact, out),
        None => {
            info!(kind, key, "not found");
            Ok(())
        }
    }
}
