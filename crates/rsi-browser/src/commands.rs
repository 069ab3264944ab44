//! One-shot commands.

use std::path::Path;

use ctm_decode::Decoder;
use rsi::{CatalogService, EntityId, Transport};

use crate::browse;
use crate::cli::Command;
use crate::error::CommandError;
use crate::export;
use crate::view;

/// Run a parsed command to completion.
pub async fn run<T: Transport>(catalog: &CatalogService<T>, command: Command) -> Result<(), CommandError> {
    match command {
        Command::Search { query, thumbnails } => search(catalog, &query.join(" "), thumbnails)
            .await
            .map(|_| ()),
        Command::Info { id } => info(catalog, &id).await,
        Command::Thumbnail { id } => thumbnail(catalog, &id).await,
        Command::Model { id } => model(catalog, &id).await,
        Command::Import { id, obj } => import(catalog, &id, obj.as_deref()).await,
        Command::Decode {
            file,
            source_axes,
            obj,
        } => decode(&file, source_axes, obj.as_deref()),
        Command::ClearCache => clear_cache(catalog),
        Command::Browse => browse::run(catalog).await,
    }
}

pub async fn search<T: Transport>(
    catalog: &CatalogService<T>,
    query: &str,
    thumbnails: bool,
) -> Result<Vec<rsi::SearchSummary>, CommandError> {
    let hits = catalog.search(query).await?;
    print!("{}", view::results(&hits));

    if thumbnails {
        for hit in &hits {
            match hit.thumbnail_url.as_deref() {
                Some(url) => {
                    let path = catalog.thumbnail(&hit.id, url).await?;
                    println!("{}  {}", hit.id, path.display());
                }
                None => tracing::warn!(id = %hit.id, "no thumbnail"),
            }
        }
    }
    Ok(hits)
}

async fn info<T: Transport>(catalog: &CatalogService<T>, id: &EntityId) -> Result<(), CommandError> {
    let record = catalog.detail(id).await?;
    print!("{}", view::detail(&record, catalog.website_url(&record).as_deref()));
    Ok(())
}

pub async fn thumbnail<T: Transport>(catalog: &CatalogService<T>, id: &EntityId) -> Result<(), CommandError> {
    let record = catalog.detail(id).await?;
    let Some(url) = record.thumbnail_url.as_deref() else {
        return Err(CommandError::Missing {
            what: "thumbnail",
            name: record.name,
        });
    };
    let path = catalog.thumbnail(id, url).await?;
    println!("{}", path.display());
    Ok(())
}

async fn model<T: Transport>(catalog: &CatalogService<T>, id: &EntityId) -> Result<(), CommandError> {
    let record = catalog.detail(id).await?;
    let path = catalog.model(id, record.model_url.as_deref()).await?;
    if !path.is_file() {
        return Err(CommandError::Missing {
            what: "model",
            name: record.name,
        });
    }
    println!("{}", path.display());
    Ok(())
}

pub async fn import<T: Transport>(
    catalog: &CatalogService<T>,
    id: &EntityId,
    obj: Option<&Path>,
) -> Result<(), CommandError> {
    let record = catalog.detail(id).await?;
    tracing::info!("importing model for {}", record.name);

    let Some(mesh) = catalog.load_mesh(id).await? else {
        return Err(CommandError::Missing {
            what: "model",
            name: record.name,
        });
    };
    println!("{}", record.name);
    print!("{}", view::mesh(&mesh));

    if let Some(path) = obj {
        export::export_obj(&mesh, &record.name, path).map_err(|e| CommandError::io(path, e))?;
        tracing::info!(path = %path.display(), "wrote OBJ");
    }
    Ok(())
}

fn decode(file: &Path, source_axes: bool, obj: Option<&Path>) -> Result<(), CommandError> {
    let bytes = std::fs::read(file).map_err(|e| CommandError::io(file, e))?;
    let decoder = if source_axes {
        Decoder::source_axes()
    } else {
        Decoder::new()
    };
    let mesh = decoder.decode(&bytes)?;
    print!("{}", view::mesh(&mesh));

    if let Some(path) = obj {
        let name = file
            .file_stem()
            .map_or_else(|| "mesh".into(), |stem| stem.to_string_lossy());
        export::export_obj(&mesh, &name, path).map_err(|e| CommandError::io(path, e))?;
        tracing::info!(path = %path.display(), "wrote OBJ");
    }
    Ok(())
}

pub fn clear_cache<T: Transport>(catalog: &CatalogService<T>) -> Result<(), CommandError> {
    if catalog.cache().is_empty() {
        println!("cache is already empty");
        return Ok(());
    }
    catalog.clear_cache()?;
    println!("cleared cache folder: {}", catalog.cache().root().display());
    Ok(())
}
