use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::BlockDevice;

/// 以宿主机上的一个镜像文件充当块设备
#[derive(Debug)]
pub struct BlockFile {
    inner: File,
    block_size: usize,
    total_blocks: usize,
}

impl BlockFile {
    /// 创建（或截断）镜像文件，并将其长度定为整个设备的大小，
    /// 未写过的块读出来全是0。
    pub fn create(
        path: impl AsRef<Path>,
        block_size: usize,
        total_blocks: usize,
    ) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        fd.set_len((block_size * total_blocks) as u64)?;

        Ok(Self {
            inner: fd,
            block_size,
            total_blocks,
        })
    }

    /// 打开已存在的镜像文件
    pub fn open(
        path: impl AsRef<Path>,
        block_size: usize,
        total_blocks: usize,
    ) -> io::Result<Self> {
        let fd = OpenOptions::new().read(true).write(true).open(path)?;

        Ok(Self {
            inner: fd,
            block_size,
            total_blocks,
        })
    }
}

impl BlockDevice for BlockFile {
    #[inline]
    fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    fn read_block(&mut self, block_id: usize, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let pos = self.position(block_id, offset, buf.len())?;
        self.inner.seek(SeekFrom::Start(pos))?;
        // 镜像被截短时读不满，视为 UnexpectedEof
        self.inner.read_exact(buf)
    }

    fn write_block(&mut self, block_id: usize, offset: usize, buf: &[u8]) -> io::Result<()> {
        let pos = self.position(block_id, offset, buf.len())?;
        self.inner.seek(SeekFrom::Start(pos))?;
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()?;
        self.inner.sync_data()
    }
}
