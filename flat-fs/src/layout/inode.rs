use std::borrow::Cow;
use std::io::Cursor;

use binrw::{BinRead, BinWrite, binrw};
use enumflags2::{BitFlags, bitflags};

use crate::BlockId;
use crate::{INODE_SIZE, MAX_DIRECT_BLOCKS, MAX_NAME_LEN};

const _: () = assert!(4 + 8 + MAX_DIRECT_BLOCKS * 4 + MAX_NAME_LEN + 1 <= INODE_SIZE);

/// 磁盘上的 inode 记录，定长 [`INODE_SIZE`] 字节。
///
/// 其身份即它在 inode 表中的槽位，故记录内不存编号。
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInode {
    /// 文件的字节数
    size: u32,
    /// 最后修改时间，自 Unix 纪元起的秒数
    mtime: u64,
    /// 直接索引块，存储容量：MAX_DIRECT_BLOCKS * BLOCK_SIZE 字节；
    /// 未用的槽位为 [`BlockId::ABSENT`]
    direct: [u32; MAX_DIRECT_BLOCKS],
    // 最后一字节留给 \0
    name: [u8; MAX_NAME_LEN],
    flags: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[bitflags]
#[repr(u8)]
pub enum InodeFlag {
    /// 已被分配
    Used = 0b0000_0001,
}

impl DiskInode {
    /// 空槽位
    pub const EMPTY: Self = Self {
        size: 0,
        mtime: 0,
        direct: [u32::MAX; MAX_DIRECT_BLOCKS],
        name: [0; MAX_NAME_LEN],
        flags: 0,
    };

    /// 填写一个已分配的 inode。
    ///
    /// 名字须短于 [`MAX_NAME_LEN`]，块数不超过 [`MAX_DIRECT_BLOCKS`]，由调用者保证。
    pub fn init(&mut self, name: &str, size: u32, mtime: u64, blocks: &[BlockId]) {
        let bytes = name.as_bytes();
        assert!(bytes.len() < MAX_NAME_LEN);
        assert!(blocks.len() <= MAX_DIRECT_BLOCKS);

        self.name = [0; MAX_NAME_LEN];
        self.name[..bytes.len()].copy_from_slice(bytes);
        self.size = size;
        self.mtime = mtime;
        self.direct = [u32::MAX; MAX_DIRECT_BLOCKS];
        for (slot, &block_id) in self.direct.iter_mut().zip(blocks) {
            *slot = block_id.into();
        }
    }

    pub fn flags(&self) -> BitFlags<InodeFlag> {
        BitFlags::from_bits_truncate(self.flags)
    }

    #[inline]
    pub fn is_used(&self) -> bool {
        self.flags().contains(InodeFlag::Used)
    }

    #[inline]
    pub fn mark_used(&mut self) {
        self.flags = (self.flags() | InodeFlag::Used).bits();
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// 名字的原始字节，不含 \0
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(MAX_NAME_LEN);
        &self.name[..len]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    /// 按序给出数据块，止于首个空缺标记
    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.direct
            .iter()
            .map(|&raw| BlockId::new(raw))
            .take_while(|block_id| !block_id.is_absent())
    }

    pub fn from_bytes(bytes: &[u8]) -> crate::Result<Self> {
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    /// 编码为定长记录，剩余部分填0
    pub fn to_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(INODE_SIZE));
        self.write(&mut cursor)?;

        let mut bytes = cursor.into_inner();
        bytes.resize(INODE_SIZE, 0);
        Ok(bytes)
    }
}

impl Default for DiskInode {
    fn default() -> Self {
        Self::EMPTY
    }
}
