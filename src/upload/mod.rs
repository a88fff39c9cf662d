//! Request-side glue for the HTTP file upload endpoint.
//!
//! The transport owns sockets and parsing. For `POST /fs/<name>` it calls
//! [`UploadSession::feed`] each time body bytes land in its receive queue, and
//! writes the returned [`UploadResponse`] once the session reports `Done`.

use embedded_storage::nor_flash::NorFlash;
use log::{info, warn};

use super::{
    config::NAME_MAX,
    error::FsError,
    fs::{FileHandle, FileInfo, Fs},
    heartbeat::Heartbeat,
    queue::ByteSource,
};

mod status;
#[cfg(test)]
mod tests;

pub use status::{UploadError, UploadResponse};

pub const UPLOAD_ROOT: &str = "/fs";

#[derive(Debug)]
pub enum UploadStep {
    /// The request body is not complete yet; feed again when more arrives.
    More,
    Done(UploadResponse, FileInfo),
}

#[derive(Default)]
pub struct UploadSession {
    file: Option<FileHandle>,
}

impl UploadSession {
    pub const fn new() -> Self {
        Self { file: None }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Bytes stored so far in this upload.
    pub fn written(&self) -> u32 {
        self.file.as_ref().map_or(0, FileHandle::written)
    }

    /// Creates the file on the first call, then drains `body` into it.
    /// `more` tells whether the request still has body bytes in flight.
    ///
    /// Any error ends the session; bytes already committed stay on flash.
    pub fn feed<F, H, S>(
        &mut self,
        fs: &mut Fs<F, H>,
        path: &str,
        body: &mut S,
        more: bool,
    ) -> Result<UploadStep, UploadError>
    where
        F: NorFlash,
        H: Heartbeat,
        S: ByteSource + ?Sized,
    {
        let mut file = match self.file.take() {
            Some(file) => file,
            None => {
                let name = parse_upload_name(path)?;
                fs.create(name)?
            }
        };

        if let Err(err) = fs.write(&mut file, body) {
            warn!(
                "upload: write failed id={} written={} err={}",
                file.id(),
                file.written(),
                err
            );
            return Err(err.into());
        }

        if more {
            self.file = Some(file);
            return Ok(UploadStep::More);
        }

        let info = fs.close(file)?;
        info!("upload: done id={} size={}", info.id, info.size);
        Ok(UploadStep::Done(UploadResponse::DONE, info))
    }

    /// Drops an interrupted upload without touching what is on flash.
    pub fn abort(&mut self) {
        if let Some(file) = self.file.take() {
            warn!(
                "upload: aborted id={} written={}",
                file.id(),
                file.written()
            );
        }
    }
}

pub fn format_request<F: NorFlash, H: Heartbeat>(
    fs: &mut Fs<F, H>,
) -> Result<UploadResponse, UploadError> {
    fs.format()?;
    Ok(UploadResponse::FORMATTED)
}

/// File name from a `/fs/<name>` request target, query string ignored.
pub fn parse_upload_name(target: &str) -> Result<&str, UploadError> {
    let path = target.split('?').next().unwrap_or(target);
    let name = path
        .strip_prefix(UPLOAD_ROOT)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or(UploadError::InvalidPath)?;
    if name.is_empty()
        || name.len() > NAME_MAX
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.chars().any(|ch| ch.is_control())
    {
        return Err(UploadError::InvalidPath);
    }
    Ok(name)
}

impl From<FsError> for UploadError {
    fn from(value: FsError) -> Self {
        Self::Fs(value)
    }
}
