use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use weblog_meta::{CustomField, Encoding};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
    /// Path to the add-in configuration file. Defaults to the platform config directory.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub verbose: Verbosity,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(name = "show", about = "Print the metadata of a document as JSON.")]
    Show(DocumentArgs),
    #[command(name = "body", about = "Print a document without its metadata block.")]
    Body(DocumentArgs),
    #[command(
        name = "set",
        about = "Change metadata fields and write them back into the document."
    )]
    Set(SetArgs),
    #[command(
        name = "migrate",
        about = "Rewrite legacy post configuration as front matter."
    )]
    Migrate(DocumentArgs),
    #[command(name = "weblogs", about = "List configured weblogs and the posts folder.")]
    Weblogs,
    #[command(name = "use", about = "Remember a weblog as the last accessed one.")]
    Use(UseArgs),
}

#[derive(Parser, Debug)]
pub struct DocumentArgs {
    /// Markdown document to read.
    #[clap()]
    pub path: PathBuf,
    /// Weblog the document is meant for. Defaults to the last accessed weblog.
    #[clap(short, long)]
    pub weblog: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SetArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
    #[clap(long)]
    pub title: Option<String>,
    #[clap(long = "abstract")]
    pub excerpt: Option<String>,
    /// Comma separated categories.
    #[clap(long)]
    pub categories: Option<String>,
    /// Comma separated keywords.
    #[clap(long)]
    pub keywords: Option<String>,
    #[clap(long)]
    pub post_id: Option<String>,
    #[clap(long)]
    pub draft: Option<bool>,
    #[clap(long)]
    pub weblog_name: Option<String>,
    #[clap(long)]
    pub featured_image: Option<String>,
    /// Custom field as `key=value`, can be specified multiple times.
    #[clap(long = "field", value_parser = parse_custom_field)]
    pub fields: Vec<CustomField>,
    /// Name of a custom field to remove, can be specified multiple times.
    #[clap(long = "remove-field")]
    pub remove_fields: Vec<String>,
    #[clap(long, value_enum, default_value_t = Encoding::FrontMatter)]
    pub encoding: Encoding,
    /// Print the updated document instead of writing it.
    #[clap(long, action)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
pub struct UseArgs {
    /// Name of a configured weblog.
    #[clap()]
    pub name: String,
}

fn parse_custom_field(value: &str) -> Result<CustomField, String> {
    match value.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(CustomField::new(key.trim(), value)),
        _ => Err(format!("expected key=value, got {value:?}")),
    }
}
