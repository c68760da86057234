use derive_more::{Display, From, Into};

/// 块编号，即块在设备上的绝对位置
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct BlockId(u32);

/// inode 编号，即 inode 在 inode 表中的槽位
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct InodeId(u32);

impl BlockId {
    /// 超级块所在的块
    pub const SUPER: Self = Self(0);

    /// inode 表的首块，紧随超级块
    pub const INODE_TABLE: Self = Self(1);

    /// 空缺标记：inode 中未用的直接索引槽位，不对应任何合法块
    pub const ABSENT: Self = Self(u32::MAX);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn is_absent(self) -> bool {
        self == Self::ABSENT
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl InodeId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
