//! # 文件系统会话层
//!
//! 把块设备、超级块与 inode 表组织成整文件的创建与读取，
//! 是唯一知晓“文件”概念的一层。
//!
//! 会话独占块设备、超级块与 inode 表；内存中的状态是权威，
//! 镜像是它的持久副本，每次改动后整体写回。
//! 同一镜像同一时刻只应被一个会话打开，这是使用者须遵守的前提，会话内部不加锁。

use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use block_dev::{BlockDevice, BlockFile};

use crate::inode_table::InodeTable;
use crate::layout::{DiskInode, SuperBlock};
use crate::{BLOCK_SIZE, MAX_DIRECT_BLOCKS, MAX_FILE_SIZE, MAX_NAME_LEN, TOTAL_BLOCKS};
use crate::{BlockId, Error, InodeId, Result};

/// 一个打开着的卷。
///
/// 由 [`FlatFileSystem::format`] 或 [`FlatFileSystem::open`] 得到，
/// [`FlatFileSystem::close`] 之后的操作一律返回 [`Error::SessionClosed`]。
#[derive(Debug)]
pub struct FlatFileSystem<D: BlockDevice = BlockFile> {
    /// 关闭后为空
    block_device: Option<D>,
    super_block: SuperBlock,
    inodes: InodeTable,
}

/// 文件的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub inode: InodeId,
    pub name: String,
    /// 文件的字节数
    pub size: usize,
    /// 最后修改时间，自 Unix 纪元起的秒数
    pub mtime: u64,
    pub blocks: Vec<BlockId>,
}

impl FlatFileSystem<BlockFile> {
    /// 在 `path` 处创建（或覆盖）镜像并格式化
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let block_file = BlockFile::create(path, BLOCK_SIZE, TOTAL_BLOCKS)?;
        Self::format(block_file)
    }

    /// 打开 `path` 处已有的镜像
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let block_file = BlockFile::open(path, BLOCK_SIZE, TOTAL_BLOCKS)?;
        Self::open(block_file)
    }
}

impl<D: BlockDevice> FlatFileSystem<D> {
    /// 格式化：预留元数据块，清空位图与 inode 表并写回
    pub fn format(block_device: D) -> Result<Self> {
        check_geometry(&block_device)?;

        let mut fs = Self {
            block_device: Some(block_device),
            super_block: SuperBlock::new(),
            inodes: InodeTable::new(),
        };
        fs.sync()?;

        log::info!(
            "formatted volume: {} blocks ({} free), {} inodes",
            fs.super_block.total_blocks(),
            fs.super_block.free_blocks(),
            fs.super_block.total_inodes(),
        );
        Ok(fs)
    }

    /// 读入超级块与 inode 表。
    ///
    /// 没有魔数可供校验，陌生或损坏的镜像也会被原样接受；
    /// 仅在计数与位图不一致时给出警告。
    pub fn open(mut block_device: D) -> Result<Self> {
        check_geometry(&block_device)?;

        let super_block = SuperBlock::load(&mut block_device)?;
        let inodes = InodeTable::load(&mut block_device)?;

        if !super_block.check() {
            log::warn!("superblock accounting is inconsistent with its bitmaps");
        }
        log::info!(
            "opened volume: {}/{} blocks free, {}/{} inodes free",
            super_block.free_blocks(),
            super_block.total_blocks(),
            super_block.free_inodes(),
            super_block.total_inodes(),
        );

        Ok(Self {
            block_device: Some(block_device),
            super_block,
            inodes,
        })
    }

    /// 卷的分配状态
    #[inline]
    pub fn super_block(&self) -> &SuperBlock {
        &self.super_block
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.block_device.is_none()
    }

    /// 在磁盘上分配新的 inode 并标记为在用
    fn alloc_inode(&mut self) -> Result<InodeId> {
        let inode_id = self.super_block.alloc_inode()?;
        self.inodes.get_mut(inode_id).mark_used();
        log::debug!("allocated inode {inode_id}");
        Ok(inode_id)
    }

    /// 在磁盘上分配新的数据块
    fn alloc_data(&mut self) -> Result<BlockId> {
        let block_id = self.super_block.alloc_block()?;
        log::debug!("allocated block {block_id}");
        Ok(block_id)
    }

    /// 创建名为 `name`、内容为 `data` 的文件，返回其 inode 编号。
    ///
    /// 名字不能为空，也不能含 \0。
    ///
    /// 已分配的 inode 与块不会回收：若在分配之后因文件过大、块耗尽或写数据失败而失败，
    /// 它们保持已分配状态，并照常写回镜像。
    pub fn create_file(&mut self, name: &str, data: &[u8]) -> Result<InodeId> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        if name.len() >= MAX_NAME_LEN {
            return Err(Error::NameTooLong { len: name.len() });
        }
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidName);
        }

        let inode_id = self.alloc_inode()?;

        let blocks_needed = data.len().div_ceil(BLOCK_SIZE);
        if blocks_needed > MAX_DIRECT_BLOCKS {
            log::warn!("inode {inode_id} left allocated: {} bytes is too large", data.len());
            self.sync_after_failure();
            return Err(Error::FileTooLarge { size: data.len() });
        }

        let mut blocks = Vec::with_capacity(blocks_needed);
        for _ in 0..blocks_needed {
            match self.alloc_data() {
                Ok(block_id) => blocks.push(block_id),
                Err(err) => {
                    log::warn!(
                        "inode {inode_id} and {} block(s) left allocated: {err}",
                        blocks.len()
                    );
                    self.sync_after_failure();
                    return Err(err);
                }
            }
        }

        let block_device = self.block_device.as_mut().ok_or(Error::SessionClosed)?;
        // 最后一块只写入余下的字节
        let written = blocks
            .iter()
            .zip(data.chunks(BLOCK_SIZE))
            .try_for_each(|(&block_id, chunk)| {
                block_device.write_block(block_id.index(), 0, chunk)
            });
        if let Err(err) = written {
            log::warn!(
                "inode {inode_id} and {} block(s) left allocated: {err}",
                blocks.len()
            );
            self.sync_after_failure();
            return Err(err.into());
        }

        self.inodes
            .get_mut(inode_id)
            .init(name, data.len() as u32, now(), &blocks);
        self.sync()?;

        log::info!(
            "created {name:?}: inode {inode_id}, {} bytes in {} block(s)",
            data.len(),
            blocks.len()
        );
        Ok(inode_id)
    }

    /// 读出名为 `name` 的文件的全部内容；同名文件取 inode 表中靠前者
    pub fn read_file(&mut self, name: &str) -> Result<Vec<u8>> {
        let block_device = self.block_device.as_mut().ok_or(Error::SessionClosed)?;
        let (inode_id, inode) = self
            .inodes
            .find(name)
            .ok_or_else(|| Error::FileNotFound(name.to_owned()))?;

        let size = (inode.size() as usize).min(MAX_FILE_SIZE);
        let mut data = vec![0; size];
        let mut read = 0;
        for (block_id, chunk) in inode.blocks().zip(data.chunks_mut(BLOCK_SIZE)) {
            block_device.read_block(block_id.index(), 0, chunk)?;
            read += chunk.len();
        }

        if read < size {
            log::warn!("inode {inode_id} references fewer blocks than its size of {size} bytes");
            data.truncate(read);
        }

        Ok(data)
    }

    /// 名为 `name` 的文件的元信息
    pub fn stat(&self, name: &str) -> Result<FileStat> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }

        self.inodes
            .find(name)
            .map(|(inode_id, inode)| FileStat::new(inode_id, inode))
            .ok_or_else(|| Error::FileNotFound(name.to_owned()))
    }

    /// 按 inode 表序列出所有文件，分配后未能填写（没有名字）的 inode 不在其中
    pub fn list(&self) -> Result<Vec<FileStat>> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }

        Ok(self
            .inodes
            .iter()
            .filter(|(_, inode)| inode.is_used() && !inode.name_bytes().is_empty())
            .map(|(inode_id, inode)| FileStat::new(inode_id, inode))
            .collect())
    }

    /// 写回超级块与整张 inode 表，并落盘
    fn sync(&mut self) -> Result<()> {
        let block_device = self.block_device.as_mut().ok_or(Error::SessionClosed)?;
        self.super_block.store(block_device)?;
        self.inodes.store(block_device)?;
        block_device.flush()?;
        log::debug!("metadata synced");
        Ok(())
    }

    /// 失败路径上的写回，出错只记录，不掩盖原本的错误
    fn sync_after_failure(&mut self) {
        if let Err(err) = self.sync() {
            log::error!("failed to persist metadata: {err}");
        }
    }

    /// 落盘并释放块设备；重复调用无副作用
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut block_device) = self.block_device.take() {
            block_device.flush()?;
            log::info!("volume closed");
        }
        Ok(())
    }
}

impl<D: BlockDevice> Drop for FlatFileSystem<D> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("failed to close volume: {err}");
        }
    }
}

impl FileStat {
    fn new(inode_id: InodeId, inode: &DiskInode) -> Self {
        Self {
            inode: inode_id,
            name: inode.name().into_owned(),
            size: inode.size() as usize,
            mtime: inode.mtime(),
            blocks: inode.blocks().collect(),
        }
    }
}

/// 块设备须与卷的参数相符
fn check_geometry(block_device: &impl BlockDevice) -> Result<()> {
    if block_device.block_size() != BLOCK_SIZE || block_device.total_blocks() < TOTAL_BLOCKS {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "device geometry {}x{} does not fit a {}x{} volume",
                block_device.total_blocks(),
                block_device.block_size(),
                TOTAL_BLOCKS,
                BLOCK_SIZE,
            ),
        )));
    }
    Ok(())
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
