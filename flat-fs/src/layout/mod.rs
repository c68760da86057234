//! # 磁盘数据结构层
//!
//! flat-fs 的磁盘布局：
//! 超级块（含块位图与 inode 位图） | inode 表 | 数据块
//!
//! 所有记录均以小端序编码，定长且以0填充。

mod super_block;
pub use super_block::SuperBlock;

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{DiskInode, InodeFlag};
