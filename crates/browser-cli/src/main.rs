use anyhow::Result;
use clap::Parser;

use browser::core::HttpVersion;
use browser::core::{Dom, NodeData};
use browser::{load, Loaded};

/// Fetch a URL and print either its parsed DOM outline or its raw source.
#[derive(Parser, Debug)]
#[command(name = "browser", about = "Minimal graphical web browser content pipeline", long_about = None)]
struct Cli {
    /// URL to load: http(s)://, file://, data:, about:, or view-source: prefixed.
    url: String,

    /// HTTP version to speak. The library defaults to 1.0; this binary
    /// defaults to 1.1 and only drops to 1.0 when asked explicitly.
    #[arg(long, env = "BROWSER_HTTP_VERSION", default_value = "1.1")]
    http_version: HttpVersion,

    /// Force the raw, entity-undecoded source view even if the URL itself
    /// isn't `view-source:`-prefixed.
    #[arg(long)]
    view_source: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let url = if cli.view_source && !cli.url.starts_with("view-source:") {
        format!("view-source:{}", cli.url)
    } else {
        cli.url.clone()
    };

    match load(&url, cli.http_version)? {
        Loaded::Source(text) => println!("{text}"),
        Loaded::Document(dom) => print_dom(&dom),
    }

    Ok(())
}

fn print_dom(dom: &Dom) {
    for (depth, id) in dom.walk(dom.root) {
        let indent = "  ".repeat(depth);
        match dom.get(id) {
            NodeData::Element { tag, attributes, .. } => {
                if attributes.is_empty() {
                    println!("{indent}<{tag}>");
                } else {
                    let attrs: Vec<String> = attributes
                        .iter()
                        .map(|(k, v)| format!("{k}=\"{v}\""))
                        .collect();
                    println!("{indent}<{tag} {}>", attrs.join(" "));
                }
            }
            NodeData::Text { text, .. } => {
                println!("{indent}{}", text.trim());
            }
        }
    }
}
