use flat_fs::{DiskInode, INODE_SIZE, INODE_TABLE_BLOCKS, RESERVED_BLOCKS};
use flat_fs::{MAX_DIRECT_BLOCKS, MAX_FILE_SIZE, MAX_NAME_LEN};

#[test]
fn volume() {
    assert_eq!(12, INODE_TABLE_BLOCKS);
    assert_eq!(13, RESERVED_BLOCKS);
    assert_eq!(10 * 1024, MAX_FILE_SIZE);
    assert_eq!(10, MAX_DIRECT_BLOCKS);
    assert_eq!(32, MAX_NAME_LEN);
}

#[test]
fn inode_record() {
    assert_eq!(INODE_SIZE, DiskInode::EMPTY.to_bytes().unwrap().len());
}
