use crate::error::FsError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadError {
    InvalidPath,
    Fs(FsError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: &'static [u8],
    pub body: &'static [u8],
}

impl UploadResponse {
    pub const DONE: Self = Self {
        status: b"200 OK",
        body: b"Done.\r\n",
    };
    pub const FORMATTED: Self = Self {
        status: b"200 OK",
        body: b"Format Successful\r\n",
    };
}

impl UploadError {
    pub fn response(self) -> UploadResponse {
        UploadResponse {
            status: self.status(),
            body: self.body(),
        }
    }

    pub fn status(self) -> &'static [u8] {
        match self {
            UploadError::InvalidPath => b"400 Bad Request",
            UploadError::Fs(err) => match err {
                FsError::FileExists => b"409 Conflict",
                FsError::NoSpace => b"507 Insufficient Storage",
                FsError::InvalidName => b"400 Bad Request",
                FsError::NotFound => b"404 Not Found",
                FsError::ChainCycle { .. }
                | FsError::BrokenChain { .. }
                | FsError::Layout(_)
                | FsError::Flash { .. } => b"500 Internal Server Error",
            },
        }
    }

    pub fn body(self) -> &'static [u8] {
        match self {
            UploadError::InvalidPath => b"invalid path",
            UploadError::Fs(err) => match err {
                FsError::FileExists => b"file exists",
                FsError::NoSpace => b"no space left",
                FsError::InvalidName => b"invalid file name",
                FsError::NotFound => b"not found",
                FsError::ChainCycle { .. } | FsError::BrokenChain { .. } => b"filesystem corrupt",
                FsError::Layout(_) => b"filesystem misconfigured",
                FsError::Flash { .. } => b"flash i/o failed",
            },
        }
    }

    pub fn log_str(self) -> &'static str {
        match self {
            UploadError::InvalidPath => "invalid upload path",
            UploadError::Fs(err) => err.as_str(),
        }
    }
}
