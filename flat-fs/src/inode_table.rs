//! # inode 表
//!
//! 定长、按下标寻址的 inode 数组，落盘时作为一整段连续区域紧随超级块。
//! 每次都写回全部槽位（无论是否在用），故区域的总大小恒定，重新读入总是完整的。

use block_dev::BlockDevice;

use crate::layout::DiskInode;
use crate::{BLOCK_SIZE, INODE_SIZE, TOTAL_INODES};
use crate::{BlockId, InodeId, Result};

const TABLE_BYTES: usize = TOTAL_INODES * INODE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeTable {
    inodes: Vec<DiskInode>,
}

impl InodeTable {
    /// 全为空槽位的表
    pub fn new() -> Self {
        Self {
            inodes: vec![DiskInode::EMPTY; TOTAL_INODES],
        }
    }

    /// 编号来自 inode 位图，不会越出 [`TOTAL_INODES`]
    #[inline]
    pub fn get_mut(&mut self, inode_id: InodeId) -> &mut DiskInode {
        &mut self.inodes[inode_id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (InodeId, &DiskInode)> {
        self.inodes
            .iter()
            .enumerate()
            .map(|(index, inode)| (InodeId::new(index as u32), inode))
    }

    /// 按表序找到首个名字相符的在用 inode；名字不要求唯一。
    /// 没有名字的 inode 是创建失败后遗留的，不参与查找。
    pub fn find(&self, name: &str) -> Option<(InodeId, &DiskInode)> {
        if name.is_empty() {
            return None;
        }
        self.iter()
            .find(|(_, inode)| inode.is_used() && inode.name_bytes() == name.as_bytes())
    }

    pub fn load(block_device: &mut impl BlockDevice) -> Result<Self> {
        let mut bytes = vec![0u8; TABLE_BYTES];
        let first_block = BlockId::INODE_TABLE.index();
        for (block_id, block) in (first_block..).zip(bytes.chunks_mut(BLOCK_SIZE)) {
            block_device.read_block(block_id, 0, block)?;
        }

        let inodes = bytes
            .chunks(INODE_SIZE)
            .map(DiskInode::from_bytes)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { inodes })
    }

    pub fn store(&self, block_device: &mut impl BlockDevice) -> Result<()> {
        let mut bytes = Vec::with_capacity(TABLE_BYTES);
        for inode in &self.inodes {
            bytes.extend(inode.to_bytes()?);
        }

        let first_block = BlockId::INODE_TABLE.index();
        for (block_id, block) in (first_block..).zip(bytes.chunks(BLOCK_SIZE)) {
            block_device.write_block(block_id, 0, block)?;
        }

        Ok(())
    }
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}
