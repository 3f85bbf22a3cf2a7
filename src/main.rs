mod args;

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info, warn};
use weblog_meta::{
    AddinConfig, Decoded, Encoding, MetaErr, ParseOutcome, Post, PostMetadata, decode,
    encode,
    fs::{read_document, write_file},
};

use crate::args::{Args, Commands, DocumentArgs, SetArgs};

#[derive(Serialize)]
struct Report<'a> {
    outcome: &'a ParseOutcome,
    metadata: &'a PostMetadata,
    post: Post,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.tracing_level_filter())
        .compact()
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), MetaErr> {
    let config_path = match args.config {
        Some(path) => path,
        None => AddinConfig::default_path()?,
    };
    debug!("using config {:?}", config_path);
    let mut config = AddinConfig::load(&config_path)?;

    match args.command {
        Commands::Show(doc) => {
            let decoded = decode_document(&config, &doc).await?;
            let report = Report {
                outcome: &decoded.outcome,
                metadata: &decoded.metadata,
                post: Post::from(&decoded.metadata),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Body(doc) => {
            let decoded = decode_document(&config, &doc).await?;
            println!("{}", decoded.metadata.body);
        }
        Commands::Set(set) => {
            let decoded = decode_document(&config, &set.document).await?;
            let mut metadata = decoded.metadata;
            apply_changes(&mut metadata, &set);
            let updated = encode(&metadata, set.encoding);
            if set.dry_run {
                println!("{updated}");
            } else {
                write_file(&set.document.path, &updated).await?;
                info!("updated {:?}", set.document.path);
            }
        }
        Commands::Migrate(doc) => {
            let decoded = decode_document(&config, &doc).await?;
            if let ParseOutcome::Partial { issues, .. } = &decoded.outcome {
                for issue in issues {
                    warn!("{issue}");
                }
            }
            let updated = encode(&decoded.metadata, Encoding::FrontMatter);
            write_file(&doc.path, &updated).await?;
            info!("migrated {:?}", doc.path);
        }
        Commands::Weblogs => {
            for weblog in config.weblogs.values() {
                let marker = if weblog.name == config.last_weblog_accessed {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {} ({:?}) {}",
                    weblog.name, weblog.weblog_type, weblog.api_url
                );
            }
            let had_folder = config.posts_folder.is_some();
            let folder: PathBuf = config.posts_folder()?;
            println!("posts folder: {}", folder.display());
            if !had_folder {
                config.save(&config_path)?;
            }
        }
        Commands::Use(use_args) => {
            if config.weblog(&use_args.name).is_none() {
                return Err(format!("weblog {:?} is not configured", use_args.name).into());
            }
            config.last_weblog_accessed = use_args.name;
            config.save(&config_path)?;
        }
    }
    Ok(())
}

async fn decode_document(config: &AddinConfig, doc: &DocumentArgs) -> Result<Decoded, MetaErr> {
    let raw = read_document(&doc.path).await?;
    let decoded = decode(&raw, &config.decode_context(doc.weblog.as_deref()));
    debug!("decoded {:?}: {:?}", doc.path, decoded.outcome);
    Ok(decoded)
}

fn apply_changes(metadata: &mut PostMetadata, set: &SetArgs) {
    if let Some(title) = &set.title {
        metadata.title = title.clone();
    }
    if let Some(excerpt) = &set.excerpt {
        metadata.excerpt = excerpt.clone();
    }
    if let Some(categories) = &set.categories {
        metadata.categories = categories.clone();
    }
    if let Some(keywords) = &set.keywords {
        metadata.keywords = keywords.clone();
    }
    if let Some(post_id) = &set.post_id {
        metadata.post_id = post_id.clone();
    }
    if let Some(draft) = set.draft {
        metadata.is_draft = draft;
    }
    if let Some(weblog_name) = &set.weblog_name {
        metadata.weblog_name = weblog_name.clone();
    }
    if let Some(url) = &set.featured_image {
        metadata.featured_image_url = Some(url.clone()).filter(|url| !url.is_empty());
    }
    for name in &set.remove_fields {
        metadata.custom_fields.remove(name);
    }
    for field in &set.fields {
        let mut field = field.clone();
        // an uploaded field keeps its server id across value changes
        field.id = metadata
            .custom_fields
            .get(&field.key)
            .and_then(|existing| existing.id.clone());
        metadata.custom_fields.insert(field);
    }
}
