use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use localbib_core::config_file::{self, ConfigFile};
use localbib_core::{
    BibView, ExpandPolicy, GroupMode, Loader, SourceFetcher, ViewOptions, generate_raw,
};
use localbib_render::{RenderOptions, render_page};

mod logging;
mod output;

use output::ColorMode;

/// Render a BibTeX bibliography as a grouped, searchable page
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the usual lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a bibliography and render it
    Render {
        /// URL or path of the .bib file (falls back to LOCALBIB_SOURCE, then config)
        source: Option<String>,

        /// Group by `year` or `type`
        #[arg(long)]
        group: Option<GroupMode>,

        /// Only show entries matching this text
        #[arg(long)]
        search: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Html)]
        format: Format,

        /// Which groups start expanded in HTML output
        #[arg(long)]
        expand: Option<ExpandPolicy>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the regenerated BibTeX for one entry
    Raw {
        /// URL or path of the .bib file
        source: String,

        /// Citation key of the entry
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Html,
    Text,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => config_file::load_explicit(path)?,
        None => config_file::load_config(),
    };

    match cli.command {
        Command::Render {
            source,
            group,
            search,
            format,
            expand,
            output,
            no_color,
        } => {
            let source = resolve_source(source, &config)?;
            render(
                &config, &source, group, search, format, expand, output, no_color,
            )
            .await
        }
        Command::Raw { source, key } => raw(&config, &source, &key).await,
    }
}

/// CLI argument > `LOCALBIB_SOURCE` > `[server] source` in config.
fn resolve_source(arg: Option<String>, config: &ConfigFile) -> anyhow::Result<String> {
    arg.or_else(|| std::env::var("LOCALBIB_SOURCE").ok())
        .or_else(|| config.source().map(str::to_string))
        .filter(|s| !s.trim().is_empty())
        .context("no bibliography source given (pass SOURCE or set LOCALBIB_SOURCE)")
}

fn loader() -> Loader {
    Loader::new(
        Arc::new(SourceFetcher::default()),
        Some(localbib_bibtex::default_parser()),
    )
}

async fn load_view(options: ViewOptions, source: &str) -> anyhow::Result<BibView> {
    let mut view = BibView::new(options);
    view.load(&loader(), source)
        .await
        .with_context(|| format!("failed to load bibliography from {source}"))?;
    Ok(view)
}

#[allow(clippy::too_many_arguments)]
async fn render(
    config: &ConfigFile,
    source: &str,
    group: Option<GroupMode>,
    search: Option<String>,
    format: Format,
    expand: Option<ExpandPolicy>,
    output: Option<PathBuf>,
    no_color: bool,
) -> anyhow::Result<()> {
    let mut view_options = config.view_options();
    if let Some(expand) = expand {
        view_options.expand = expand;
    }
    let mut view = load_view(view_options, source).await?;

    if let Some(mode) = group {
        view.set_group_mode(mode);
    }
    if let Some(query) = search.as_deref() {
        let matches = view.handle_search(query);
        tracing::info!(query, matches, "filtered bibliography");
    }

    let mut writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };

    match format {
        Format::Html => {
            let options = RenderOptions {
                title: config.title().unwrap_or("Publications").to_string(),
                interactive: false,
                allow_note_markup: config.allow_note_markup(),
                ..Default::default()
            };
            writer.write_all(render_page(&view, &options).as_bytes())?;
        }
        Format::Text => {
            let color = ColorMode(!no_color && output.is_none());
            output::print_view(&mut *writer, &view, color)?;
        }
    }
    writer.flush()?;

    if let Some(path) = &output {
        tracing::info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

async fn raw(config: &ConfigFile, source: &str, key: &str) -> anyhow::Result<()> {
    let view = load_view(config.view_options(), source).await?;
    let entry = view
        .find(key)
        .with_context(|| format!("no entry with key `{key}` in {source}"))?;
    println!("{}", generate_raw(entry));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_render_flags() {
        let cli = Cli::parse_from([
            "localbib", "render", "refs.bib", "--group", "type", "--search", "graph",
            "--format", "text", "--expand", "all", "-o", "out.txt",
        ]);
        match cli.command {
            Command::Render {
                source,
                group,
                search,
                format,
                expand,
                output,
                no_color,
            } => {
                assert_eq!(source.as_deref(), Some("refs.bib"));
                assert_eq!(group, Some(GroupMode::Type));
                assert_eq!(search.as_deref(), Some("graph"));
                assert_eq!(format, Format::Text);
                assert_eq!(expand, Some(ExpandPolicy::All));
                assert_eq!(output, Some(PathBuf::from("out.txt")));
                assert!(!no_color);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_group_mode_is_rejected() {
        assert!(Cli::try_parse_from(["localbib", "render", "x.bib", "--group", "venue"]).is_err());
    }

    #[test]
    fn explicit_source_wins() {
        let config = ConfigFile::default();
        let source = resolve_source(Some("a.bib".into()), &config).unwrap();
        assert_eq!(source, "a.bib");
    }

    #[tokio::test]
    async fn render_writes_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("refs.bib");
        std::fs::write(
            &bib,
            "@article{k1, title = {Graph Kernels}, author = {Ada Lovelace}, year = {2021}}\n",
        )
        .unwrap();
        let out = dir.path().join("page.html");

        render(
            &ConfigFile::default(),
            bib.to_str().unwrap(),
            None,
            None,
            Format::Html,
            None,
            Some(out.clone()),
            true,
        )
        .await
        .unwrap();

        let html = std::fs::read_to_string(out).unwrap();
        assert!(html.contains("<summary>2021 (1)</summary>"));
        assert!(html.contains("Graph Kernels"));
    }

    #[tokio::test]
    async fn raw_reports_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let bib = dir.path().join("refs.bib");
        std::fs::write(&bib, "@misc{only, title = {Only}}\n").unwrap();
        let err = raw(&ConfigFile::default(), bib.to_str().unwrap(), "other")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no entry with key `other`"));
    }
}
