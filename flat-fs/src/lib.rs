//! # flat-fs
//!
//! 单卷、单目录的玩具文件系统：
//! 一个定长的块设备镜像，一个记录分配状态的超级块，一张扁平的 inode 表，
//! 以及整文件的创建与读取。
//!
//! 磁盘布局（按块）：
//! 超级块 | inode 表 | 数据块
//!
//! 超级块与 inode 表所占的块在格式化时即被标记为已分配，永不分给文件数据。

/* flat-fs 的整体架构，自上而下 */

// 文件系统会话层：格式化、加载、创建与读取文件
mod ffs;
pub use ffs::{FileStat, FlatFileSystem};

// inode 表：定长、按下标寻址的 inode 数组
mod inode_table;

// 磁盘数据结构层：超级块、位图、inode 记录
mod layout;
pub use layout::{Bitmap, DiskInode, InodeFlag, SuperBlock};

// 块编号与 inode 编号
mod id;
pub use id::{BlockId, InodeId};

mod error;
pub use error::{Error, Result};

// 磁盘块设备接口层
pub use block_dev::{BlockDevice, BlockFile};

pub const BLOCK_SIZE: usize = 1024;
pub const TOTAL_BLOCKS: usize = 1024;
pub const TOTAL_INODES: usize = 128;
/// 文件名的最大长度，含结尾的 \0
pub const MAX_NAME_LEN: usize = 32;
/// 每个文件最多的直接索引块数
pub const MAX_DIRECT_BLOCKS: usize = 10;
pub const MAX_FILE_SIZE: usize = MAX_DIRECT_BLOCKS * BLOCK_SIZE;

/// 磁盘上一条 inode 记录的大小
pub const INODE_SIZE: usize = 96;
/// inode 表占用的块数
pub const INODE_TABLE_BLOCKS: usize = (TOTAL_INODES * INODE_SIZE).div_ceil(BLOCK_SIZE);
/// 超级块与 inode 表共占的块数，它们位于设备开头
pub const RESERVED_BLOCKS: usize = 1 + INODE_TABLE_BLOCKS;

const _: () = assert!(TOTAL_BLOCKS % 64 == 0 && TOTAL_INODES % 64 == 0);
const _: () = assert!(RESERVED_BLOCKS < TOTAL_BLOCKS);
