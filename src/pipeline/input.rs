//! Input validation: confirm the operator-picked deck is usable before
//! any work starts.
//!
//! Rejections here are cheap and immediate — the run has not created a
//! temp directory, touched pdfium, or opened a provider connection yet.
//! We validate the PDF magic bytes (`%PDF`) so callers get a meaningful
//! error rather than a pdfium crash, and enforce the size cap up front
//! because an oversized deck should never reach the rasteriser.

use crate::error::DecktalkError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate the deck path: existence, readability, magic bytes, size cap.
///
/// Returns the canonical path to hand to the rasteriser.
pub fn validate_deck(path: &Path, max_input_mb: u64) -> Result<PathBuf, DecktalkError> {
    if !path.exists() {
        return Err(DecktalkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let metadata = std::fs::metadata(path).map_err(|_| DecktalkError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let size_mb = metadata.len() / (1024 * 1024);
    if size_mb > max_input_mb {
        return Err(DecktalkError::DeckTooLarge {
            path: path.to_path_buf(),
            size_mb,
            limit_mb: max_input_mb,
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(DecktalkError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DecktalkError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(DecktalkError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated deck: {} ({} MB)", path.display(), size_mb);
    Ok(path.to_path_buf())
}
