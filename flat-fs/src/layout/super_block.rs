use std::io::Cursor;

use binrw::{BinRead, BinWrite, binrw};
use block_dev::BlockDevice;

use super::Bitmap;
use crate::{BLOCK_SIZE, RESERVED_BLOCKS, TOTAL_BLOCKS, TOTAL_INODES};
use crate::{BlockId, Error, InodeId};

const BLOCK_GROUPS: usize = TOTAL_BLOCKS / 64;
const INODE_GROUPS: usize = TOTAL_INODES / 64;

// 四个计数器加两张位图，须放得进一个块
const _: () = assert!(4 * 4 + (BLOCK_GROUPS + INODE_GROUPS) * 8 <= BLOCK_SIZE);

/// 超级块：
/// - 记录块与 inode 的总数和空闲数；
/// - 持有块位图与 inode 位图，是空间分配的唯一依据。
///
/// 恒有 `free_blocks == total_blocks - popcount(block_bitmap)`，inode 亦然；
/// 超级块与 inode 表所占的块自格式化起即为已分配，不会被分配出去。
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    total_blocks: u32,
    total_inodes: u32,
    free_blocks: u32,
    free_inodes: u32,
    block_bitmap: [u64; BLOCK_GROUPS],
    inode_bitmap: [u64; INODE_GROUPS],
}

impl SuperBlock {
    /// 格式化时的超级块：预留超级块与 inode 表所占的块，inode 全部空闲
    pub fn new() -> Self {
        let mut super_block = Self {
            total_blocks: TOTAL_BLOCKS as u32,
            total_inodes: TOTAL_INODES as u32,
            free_blocks: (TOTAL_BLOCKS - RESERVED_BLOCKS) as u32,
            free_inodes: TOTAL_INODES as u32,
            block_bitmap: [0; BLOCK_GROUPS],
            inode_bitmap: [0; INODE_GROUPS],
        };

        for block_id in 0..RESERVED_BLOCKS as u32 {
            super_block.block_bitmap.set(block_id);
        }

        super_block
    }

    #[inline]
    pub fn total_blocks(&self) -> u32 {
        self.total_blocks
    }

    #[inline]
    pub fn total_inodes(&self) -> u32 {
        self.total_inodes
    }

    #[inline]
    pub fn free_blocks(&self) -> u32 {
        self.free_blocks
    }

    #[inline]
    pub fn free_inodes(&self) -> u32 {
        self.free_inodes
    }

    /// 分配编号最小的空闲块
    pub fn alloc_block(&mut self) -> crate::Result<BlockId> {
        let block_id = self.block_bitmap.alloc().ok_or(Error::NoFreeBlocks)?;
        self.free_blocks = self.free_blocks.saturating_sub(1);
        Ok(BlockId::new(block_id))
    }

    /// 分配编号最小的空闲 inode。
    /// 只改动位图与计数，inode 记录的使用标记由持有 inode 表者设置。
    pub fn alloc_inode(&mut self) -> crate::Result<InodeId> {
        let inode_id = self.inode_bitmap.alloc().ok_or(Error::NoFreeInodes)?;
        self.free_inodes = self.free_inodes.saturating_sub(1);
        Ok(InodeId::new(inode_id))
    }

    #[inline]
    pub fn is_block_allocated(&self, block_id: BlockId) -> bool {
        self.block_bitmap.is_set(block_id.into())
    }

    #[inline]
    pub fn is_inode_allocated(&self, inode_id: InodeId) -> bool {
        self.inode_bitmap.is_set(inode_id.into())
    }

    /// 校验计数与位图一致，且预留块均已标记
    pub fn check(&self) -> bool {
        let blocks_consistent = self.free_blocks as u64 + self.block_bitmap.count_ones() as u64
            == self.total_blocks as u64;
        let inodes_consistent = self.free_inodes as u64 + self.inode_bitmap.count_ones() as u64
            == self.total_inodes as u64;
        let reserved_marked =
            (0..RESERVED_BLOCKS as u32).all(|block_id| self.block_bitmap.is_set(block_id));

        blocks_consistent && inodes_consistent && reserved_marked
    }

    pub fn load(block_device: &mut impl BlockDevice) -> crate::Result<Self> {
        let mut block = [0u8; BLOCK_SIZE];
        block_device.read_block(BlockId::SUPER.index(), 0, &mut block)?;
        Ok(Self::read(&mut Cursor::new(&block[..]))?)
    }

    /// 写回超级块，块内剩余部分填0
    pub fn store(&self, block_device: &mut impl BlockDevice) -> crate::Result<()> {
        let mut cursor = Cursor::new(Vec::with_capacity(BLOCK_SIZE));
        self.write(&mut cursor)?;

        let mut block = cursor.into_inner();
        block.resize(BLOCK_SIZE, 0);
        block_device.write_block(BlockId::SUPER.index(), 0, &block)?;
        Ok(())
    }
}

impl Default for SuperBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh() {
        let super_block = SuperBlock::new();
        assert!(super_block.check());
        assert_eq!(
            super_block.free_blocks() as usize,
            TOTAL_BLOCKS - RESERVED_BLOCKS
        );
        assert_eq!(super_block.free_inodes() as usize, TOTAL_INODES);
        assert!(super_block.is_block_allocated(BlockId::SUPER));
        assert!(super_block.is_block_allocated(BlockId::new(RESERVED_BLOCKS as u32 - 1)));
        assert!(!super_block.is_block_allocated(BlockId::new(RESERVED_BLOCKS as u32)));
        assert!(!super_block.is_block_allocated(BlockId::ABSENT));
    }

    #[test]
    fn alloc_skips_reserved() {
        let mut super_block = SuperBlock::new();
        let block_id = super_block.alloc_block().unwrap();
        assert_eq!(block_id.index(), RESERVED_BLOCKS);
        assert_eq!(super_block.alloc_inode().unwrap(), InodeId::new(0));
        assert_eq!(super_block.alloc_inode().unwrap(), InodeId::new(1));
        assert!(super_block.check());
    }

    #[test]
    fn alloc_exhausted() {
        let mut super_block = SuperBlock::new();
        for _ in 0..TOTAL_INODES {
            super_block.alloc_inode().unwrap();
        }
        assert!(matches!(super_block.alloc_inode(), Err(Error::NoFreeInodes)));
        assert_eq!(super_block.free_inodes(), 0);

        for _ in RESERVED_BLOCKS..TOTAL_BLOCKS {
            super_block.alloc_block().unwrap();
        }
        assert!(matches!(super_block.alloc_block(), Err(Error::NoFreeBlocks)));
        assert_eq!(super_block.free_blocks(), 0);
        assert!(super_block.check());
    }

    #[test]
    fn encoded_layout() {
        let mut super_block = SuperBlock::new();
        super_block.alloc_inode().unwrap();

        let mut cursor = Cursor::new(Vec::new());
        super_block.write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();

        assert_eq!(&bytes[0..4], &(TOTAL_BLOCKS as u32).to_le_bytes());
        assert_eq!(&bytes[4..8], &(TOTAL_INODES as u32).to_le_bytes());
        assert_eq!(&bytes[12..16], &(TOTAL_INODES as u32 - 1).to_le_bytes());
        // 块位图首字节：0..8 号块均为预留块
        assert_eq!(bytes[16], 0xFF);
        // inode 位图紧随块位图
        assert_eq!(bytes[16 + TOTAL_BLOCKS / 8], 0b0000_0001);

        let decoded = SuperBlock::read(&mut Cursor::new(&bytes[..])).unwrap();
        assert_eq!(decoded, super_block);
    }
}
