//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、光盘、U盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 上层只按块寻址，但允许在块内偏移处读写一段不超过块尾的数据，
//! 例如文件的最后一块通常只写入一部分。

mod block_file;

use std::io;

pub use self::block_file::BlockFile;

/// 块设备驱动特质
///
/// 设备由唯一的使用者独占，故读写都取 `&mut self`。
pub trait BlockDevice {
    /// 一个块的字节量
    fn block_size(&self) -> usize;

    /// 设备的总块数
    fn total_blocks(&self) -> usize;

    /// 从 `block_id` 块的 `offset` 处读满 `buf`
    fn read_block(&mut self, block_id: usize, offset: usize, buf: &mut [u8]) -> io::Result<()>;

    /// 把 `buf` 写入 `block_id` 块的 `offset` 处
    fn write_block(&mut self, block_id: usize, offset: usize, buf: &[u8]) -> io::Result<()>;

    /// 将缓冲的写入落盘
    fn flush(&mut self) -> io::Result<()>;

    /// 校验一次访问落在设备范围内，并换算出它在设备上的字节位置
    fn position(&self, block_id: usize, offset: usize, len: usize) -> io::Result<u64> {
        if block_id >= self.total_blocks() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "block {block_id} out of range (device has {} blocks)",
                    self.total_blocks()
                ),
            ));
        }

        if offset + len > self.block_size() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "access of {len} bytes at offset {offset} crosses the end of block {block_id}"
                ),
            ));
        }

        Ok((block_id * self.block_size() + offset) as u64)
    }
}
