use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// 镜像的创建、打开、读写失败
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no free blocks")]
    NoFreeBlocks,

    #[error("no free inodes")]
    NoFreeInodes,

    #[error("file name too long ({len} bytes)")]
    NameTooLong { len: usize },

    /// 名字为空，或含有 \0 而无法在磁盘上原样保存
    #[error("invalid file name")]
    InvalidName,

    #[error("file too large for inode ({size} bytes)")]
    FileTooLarge { size: usize },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("filesystem session is closed")]
    SessionClosed,
}

impl Error {
    /// 是否属于空间耗尽一类的错误
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::NoFreeBlocks | Self::NoFreeInodes)
    }
}

// 记录都是定长的，编解码错误只可能来自底层读写
impl From<binrw::Error> for Error {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(err) => Self::Io(err),
            other => Self::Io(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
