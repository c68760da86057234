#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use flat_fs::{BLOCK_SIZE, BlockDevice, TOTAL_BLOCKS};

/// 内存中的块设备，克隆体共享同一份存储
#[derive(Debug, Clone)]
pub struct RamDisk {
    data: Rc<RefCell<Vec<u8>>>,
    /// 拒绝写入此编号及其后的块
    fail_writes_from: Option<usize>,
}

impl RamDisk {
    pub fn new() -> Self {
        Self {
            data: Rc::new(RefCell::new(vec![0; BLOCK_SIZE * TOTAL_BLOCKS])),
            fail_writes_from: None,
        }
    }

    /// 共享存储，但写 `block_id` 及其后的块时报错
    pub fn failing_from(&self, block_id: usize) -> Self {
        Self {
            data: Rc::clone(&self.data),
            fail_writes_from: Some(block_id),
        }
    }
}

impl BlockDevice for RamDisk {
    fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    fn total_blocks(&self) -> usize {
        TOTAL_BLOCKS
    }

    fn read_block(&mut self, block_id: usize, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let pos = self.position(block_id, offset, buf.len())? as usize;
        buf.copy_from_slice(&self.data.borrow()[pos..pos + buf.len()]);
        Ok(())
    }

    fn write_block(&mut self, block_id: usize, offset: usize, buf: &[u8]) -> io::Result<()> {
        let pos = self.position(block_id, offset, buf.len())? as usize;
        if self.fail_writes_from.is_some_and(|first| block_id >= first) {
            return Err(io::Error::other(format!("write to block {block_id} failed")));
        }
        self.data.borrow_mut()[pos..pos + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 形如 `0, 1, 2, ...` 循环的字节序列
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
