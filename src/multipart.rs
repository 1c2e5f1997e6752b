// multipart/form-data body builder for the add endpoint.
//
// Wraps a reqwest `Form`. Every part is read into memory as it is added, so
// each file handle is released before the next one opens, and a failure
// halfway through a directory aborts the upload before any network traffic.

use crate::error::{IpfsError, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::fs::{self, File};
use std::io::{self, Read};
use std::mem;
use std::path::Path;

/// Form field name the node expects for every uploaded entry.
const FIELD_NAME: &str = "file";
const FILE_CONTENT_TYPE: &str = "application/octet-stream";
const DIRECTORY_CONTENT_TYPE: &str = "application/x-directory";

/// Accumulates `file` parts under one boundary; finalized once by `finish`.
pub struct MultipartBuilder {
    form: Form,
    names: Vec<String>,
    bytes: u64,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        MultipartBuilder {
            form: Form::new(),
            names: Vec::new(),
            bytes: 0,
        }
    }

    /// Build the body for a path: one part for a file, or the full tree
    /// below a directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| IpfsError::io(path, e))?;
        let mut builder = MultipartBuilder::new();
        if meta.is_dir() {
            builder.add_tree(path, None)?;
        } else {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| FIELD_NAME.to_string());
            builder.add_file(&name, path)?;
        }
        Ok(builder)
    }

    pub fn boundary(&self) -> &str {
        self.form.boundary()
    }

    /// Entry names in the order their parts were added.
    pub fn part_names(&self) -> &[String] {
        &self.names
    }

    pub fn part_count(&self) -> usize {
        self.names.len()
    }

    /// Content bytes buffered so far, headers excluded.
    pub fn content_bytes(&self) -> u64 {
        self.bytes
    }

    /// Append a part and copy `reader` to EOF into it. The reader is
    /// borrowed and left open.
    pub fn add_reader<R: Read + ?Sized>(&mut self, name: &str, reader: &mut R) -> io::Result<u64> {
        let mut buf = Vec::new();
        let copied = io::copy(reader, &mut buf)?;
        self.push(name, buf, FILE_CONTENT_TYPE)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.bytes += copied;
        Ok(copied)
    }

    /// Append a part holding the contents of the file at `path`.
    pub fn add_file(&mut self, name: &str, path: &Path) -> Result<u64> {
        let mut file = File::open(path).map_err(|e| IpfsError::io(path, e))?;
        let copied = self
            .add_reader(name, &mut file)
            .map_err(|e| IpfsError::io(path, e))?;
        tracing::debug!(name, bytes = copied, "added file part");
        Ok(copied)
    }

    /// Append an empty directory marker part.
    pub fn add_directory(&mut self, name: &str) -> Result<()> {
        self.push(name, Vec::new(), DIRECTORY_CONTENT_TYPE)
            .map_err(IpfsError::Network)?;
        tracing::debug!(name, "added directory part");
        Ok(())
    }

    /// Hand over the finished form; reqwest writes the closing delimiter.
    pub fn finish(self) -> Form {
        self.form
    }

    fn push(&mut self, name: &str, content: Vec<u8>, content_type: &str) -> reqwest::Result<()> {
        let part = Part::bytes(content)
            .file_name(encode_name(name))
            .mime_str(content_type)?;
        let form = mem::take(&mut self.form);
        self.form = form.part(FIELD_NAME, part);
        self.names.push(name.to_string());
        Ok(())
    }

    /// Walk `dir` in file-name order. Nested entries are named by their path
    /// relative to the uploaded root, joined with `/`. Symlinked files are
    /// followed; symlinked directories are skipped so a link back to an
    /// ancestor cannot loop.
    fn add_tree(&mut self, dir: &Path, prefix: Option<&str>) -> Result<()> {
        let mut entries = fs::read_dir(dir)
            .map_err(|e| IpfsError::io(dir, e))?
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| IpfsError::io(dir, e))?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let name = match prefix {
                Some(prefix) => format!("{}/{}", prefix, file_name),
                None => file_name,
            };
            let file_type = entry.file_type().map_err(|e| IpfsError::io(&path, e))?;
            if file_type.is_dir() {
                self.add_directory(&name)?;
                self.add_tree(&path, Some(&name))?;
            } else if file_type.is_file() {
                self.add_file(&name, &path)?;
            } else if file_type.is_symlink() {
                let target = fs::metadata(&path).map_err(|e| IpfsError::io(&path, e))?;
                if target.is_file() {
                    self.add_file(&name, &path)?;
                } else {
                    tracing::debug!(path = %path.display(), "skipping symlink to non-file");
                }
            } else {
                tracing::debug!(path = %path.display(), "skipping special file");
            }
        }
        Ok(())
    }
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The node query-unescapes file names, so `+`, `%`, `/` and quotes must go
/// out escaped to arrive unchanged.
pub(crate) fn encode_name(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes()).collect()
}
