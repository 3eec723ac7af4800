//! File name validation and resolution
//!
//! Names travel on the wire as bare base names. Anything that could address a
//! location outside the storage directory is refused before touching the disk.

use std::path::{Path, PathBuf};

use crate::error::{TransferError, TransferResult};

/// Last component of `path`, with `\` treated as a separator too.
///
/// Trailing separators are ignored. An empty path yields `"."` and a path made
/// only of separators yields `"/"`.
pub fn file_basename(path: &str) -> String {
	let normalized = path.replace('\\', "/");
	if normalized.is_empty() {
		return ".".to_string();
	}
	let trimmed = normalized.trim_end_matches('/');
	if trimmed.is_empty() {
		return "/".to_string();
	}
	match trimmed.rfind('/') {
		Some(pos) => trimmed[pos + 1..].to_string(),
		None => trimmed.to_string(),
	}
}

/// Check that `name` is a single, plain path component
pub fn is_name_safe(name: &str) -> bool {
	!name.is_empty()
		&& name != "."
		&& name != ".."
		&& !name.contains(['/', '\\', '\0'])
}

/// Validate a name received from a peer
pub fn validate_file_name(name: &str) -> TransferResult<()> {
	if !is_name_safe(name) {
		return Err(TransferError::malformed(format!("Unsafe file name: {:?}", name)));
	}
	Ok(())
}

/// Resolve a peer-supplied name inside `dir`
pub fn resolve_in_dir(dir: &Path, name: &str) -> TransferResult<PathBuf> {
	validate_file_name(name)?;
	Ok(dir.join(name))
}


// vim: ts=4
