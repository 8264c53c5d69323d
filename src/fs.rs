use std::path::{Component, Path, PathBuf};

use tokio::{
    fs::{OpenOptions, create_dir_all},
    io::AsyncWriteExt,
};
use tracing::debug;

use crate::error::BarErr;

/// Writes `content` to `path`, creating missing parent directories and replacing whatever was
/// there before.
pub async fn write_file(path: &Path, content: &[u8]) -> Result<(), BarErr> {
    let materialization = |source| BarErr::Materialization {
        path: path.to_path_buf(),
        source,
    };
    if let Some(prefix) = path.parent() {
        create_dir_all(prefix).await.map_err(materialization)?;
    }
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(materialization)?;
    file.write_all(content).await.map_err(materialization)?;
    file.flush().await.map_err(materialization)?;
    debug!("write to file: {}", path.display());
    Ok(())
}

/// Directory under `root` that holds everything generated for `tag`.
pub fn tag_dir(root: &Path, tag: &str) -> Result<PathBuf, BarErr> {
    let mut components = Path::new(tag).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None)
            if segment == tag && !tag.contains(['/', '\\']) =>
        {
            Ok(root.join("tags").join(tag))
        }
        _ => Err(BarErr::Materialization {
            path: root.join("tags").join(tag),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("tag {tag:?} is not a valid directory name"),
            ),
        }),
    }
}
