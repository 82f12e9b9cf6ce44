//! `snippet-site` - run the site's page behaviors against HTML files.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use snippet_core::{
    DispatchOutcome, Document, FilterButtons, HighlightConfig, Highlighter, Location, MatchMode,
    NavConfig, NoServiceWorkers, Page, SiteConfig, SiteScript, StaticSiteHost,
    mark_active_nav_links,
};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:5000/index.html";

#[derive(Debug, Parser)]
#[command(name = "snippet-site", version, about = "Snippet site page behaviors, headless")]
struct Cli {
    /// JSON config file (defaults match the site's markup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Highlight a search term in an HTML file and print the result
    Highlight {
        /// HTML file to read
        file: PathBuf,
        /// Search term (trimmed and lowercased)
        term: String,
        /// Treat the term as a regex pattern instead of literal text
        #[arg(long)]
        pattern: bool,
        /// Marker class (overrides the config)
        #[arg(long)]
        class: Option<String>,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mark the nav link for a URL as active and print the result
    Nav {
        /// HTML file to read
        file: PathBuf,
        /// Current page URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Print the URL a filter button navigates to
    Filter {
        /// Button element id (e.g. `python`, `c++`, `all`)
        button: String,
        /// Current page URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// List the language filter buttons
    Languages,
    /// Print the effective configuration as JSON
    Config,
    /// Load a page, then replay searches and clicks through its handlers
    Dispatch {
        /// HTML file to read
        file: PathBuf,
        /// Current page URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        /// Site root used to resolve the service worker script
        #[arg(long)]
        site_root: Option<PathBuf>,
        /// Submit the search form with this value (repeatable)
        #[arg(long)]
        search: Vec<String>,
        /// Click the element with this id (repeatable, runs after searches)
        #[arg(long)]
        click: Vec<String>,
    },
}

/// `RUST_LOG` wins when set; otherwise `--verbose` picks debug over info.
fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(verbose))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SiteConfig> {
    match path {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SiteConfig::default()),
    }
}

fn read_document(path: &Path) -> Result<Document> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Document::parse_html(&html))
}

fn write_output(html: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{html}");
            Ok(())
        }
    }
}

fn highlight_config(
    base: &HighlightConfig,
    pattern: bool,
    class: Option<String>,
) -> HighlightConfig {
    let mut config = base.clone();
    if pattern {
        config.match_mode = MatchMode::Pattern;
    }
    if let Some(class) = class {
        config.marker_class = class;
    }
    config
}

fn run_highlight(
    file: &Path,
    term: &str,
    highlighter_config: HighlightConfig,
    output: Option<&Path>,
) -> Result<()> {
    let mut doc = read_document(file)?;
    let root = doc.body().unwrap_or(doc.root());
    let highlighter = Highlighter::new(highlighter_config);
    match highlighter.highlight_input(&mut doc, root, term)? {
        Some(report) => info!(
            matches = report.matches,
            cleared = report.cleared,
            nodes = report.text_nodes_rewritten,
            "highlighted"
        ),
        None => info!("empty search term; document unchanged"),
    }
    write_output(&doc.to_html(), output)
}

fn run_nav(nav: &NavConfig, file: &Path, url: &str) -> Result<()> {
    let mut doc = read_document(file)?;
    let location = Location::parse(url)?;
    let report = mark_active_nav_links(&mut doc, location.path(), nav);
    info!(active = report.active.len(), inactive = report.inactive.len(), "nav marked");
    write_output(&doc.to_html(), None)
}

fn run_filter(button: &str, url: &str) -> Result<()> {
    let location = Location::parse(url)?;
    let Some(target) = FilterButtons::standard().navigate(button, &location)? else {
        bail!("unknown filter button '{button}'");
    };
    println!("{target}");
    Ok(())
}

fn run_languages() {
    println!("{:<8} {:<12} label", "button", "lang");
    println!("{:<8} {:<12} All snippets", snippet_core_lang::ALL_BUTTON_ID, "(reset)");
    for filter in snippet_core_lang::standard_filters() {
        let mut button = filter.button_id.clone();
        for alias in &filter.aliases {
            button.push('|');
            button.push_str(alias);
        }
        println!("{:<8} {:<12} {}", button, filter.query_value, filter.label);
    }
}

fn report_outcomes(outcomes: &[DispatchOutcome]) {
    for outcome in outcomes {
        match outcome {
            DispatchOutcome::ServiceWorker(result) => info!(?result, "service worker"),
            DispatchOutcome::NavMarked(report) => info!(
                active = report.active.len(),
                inactive = report.inactive.len(),
                "nav marked"
            ),
            DispatchOutcome::Highlighted(report) => info!(matches = report.matches, "highlighted"),
            DispatchOutcome::SearchIgnored => info!("empty search ignored"),
            DispatchOutcome::SearchFailed(err) => info!(error = %err, "search failed"),
            DispatchOutcome::Navigated(url) => info!(url = %url, "navigated"),
        }
    }
}

fn run_dispatch(
    config: SiteConfig,
    file: &Path,
    url: &str,
    site_root: Option<PathBuf>,
    searches: &[String],
    clicks: &[String],
) -> Result<()> {
    let doc = read_document(file)?;
    let location = Location::parse(url)?;
    let script = SiteScript::new(config, FilterButtons::standard());

    match site_root {
        Some(root) => {
            let page = Page::new(doc, location, StaticSiteHost::new(root), script);
            replay(page, searches, clicks)
        }
        None => {
            let page = Page::new(doc, location, NoServiceWorkers, script);
            replay(page, searches, clicks)
        }
    }
}

fn replay<H: snippet_core::ServiceWorkerHost>(
    mut page: Page<H>,
    searches: &[String],
    clicks: &[String],
) -> Result<()> {
    info!(handlers = page.handlers().len(), "page script installed");
    report_outcomes(&page.load());
    for search in searches {
        report_outcomes(&page.submit_search(search));
    }
    for click in clicks {
        let outcomes = page.click(click);
        if outcomes.is_empty() {
            info!(element = %click, "click had no handler");
        }
        report_outcomes(&outcomes);
    }
    println!("{}", page.location().url());
    write_output(&page.document().to_html(), None)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Highlight {
            file,
            term,
            pattern,
            class,
            output,
        } => {
            let highlighter_config = highlight_config(&config.highlight, pattern, class);
            run_highlight(&file, &term, highlighter_config, output.as_deref())
        }
        Command::Nav { file, url } => run_nav(&config.nav, &file, &url),
        Command::Filter { button, url } => run_filter(&button, &url),
        Command::Languages => {
            run_languages();
            Ok(())
        }
        Command::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
        Command::Dispatch {
            file,
            url,
            site_root,
            search,
            click,
        } => run_dispatch(config, &file, &url, site_root, &search, &click),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_highlight_args() {
        let cli = Cli::parse_from([
            "snippet-site",
            "highlight",
            "index.html",
            "World",
            "--pattern",
            "--class",
            "hit",
        ]);
        let Command::Highlight {
            term,
            pattern,
            class,
            ..
        } = cli.command
        else {
            panic!("expected highlight");
        };
        assert_eq!(term, "World");
        assert!(pattern);

        let config = highlight_config(&HighlightConfig::default(), pattern, class);
        assert_eq!(config.match_mode, MatchMode::Pattern);
        assert_eq!(config.marker_class, "hit");
    }

    #[test]
    fn test_log_filter_defaults() {
        let filter = EnvFilter::builder()
            .with_default_directive(Level::WARN.into())
            .parse_lossy("");
        assert_eq!(filter.to_string(), "warn");

        let filter = EnvFilter::builder()
            .with_default_directive(Level::INFO.into())
            .parse_lossy("trace");
        assert_eq!(filter.to_string(), "trace");
    }

    #[test]
    fn test_dispatch_repeatable_args() {
        let cli = Cli::parse_from([
            "snippet-site",
            "dispatch",
            "index.html",
            "--search",
            "world",
            "--search",
            "hello",
            "--click",
            "python",
        ]);
        let Command::Dispatch {
            search, click, url, ..
        } = cli.command
        else {
            panic!("expected dispatch");
        };
        assert_eq!(search, vec!["world", "hello"]);
        assert_eq!(click, vec!["python"]);
        assert_eq!(url, DEFAULT_URL);
    }
}
