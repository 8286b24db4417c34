/*

A b-tree page is divided into regions in the following order:

The 100-byte database file header (found on page 1 only)
The 8 or 12 byte b-tree page header
The cell pointer array
Unallocated space
The cell content area
The reserved region.
The 100-byte database file header is found only on page 1, which is always a table b-tree page. All other b-tree pages in the database file omit this 100-byte header.

The reserved region is an area of unused space at the end of every page (except the locking page) that extensions can use to hold per-page information. The size of the reserved region is determined by the one-byte unsigned integer found at an offset of 20 into the database file header. The size of the reserved region is usually zero.

The b-tree page header is 8 bytes in size for leaf pages and 12 bytes for interior pages. All multibyte values in the page header are big-endian. The b-tree page header is composed of the following fields:

B-tree Page Header Format
Offset	Size	Description
0	1	The one-byte flag at offset 0 indicating the b-tree page type.
A value of 2 (0x02) means the page is an interior index b-tree page.
A value of 5 (0x05) means the page is an interior table b-tree page.
A value of 10 (0x0a) means the page is a leaf index b-tree page.
A value of 13 (0x0d) means the page is a leaf table b-tree page.
Any other value for the b-tree page type is an error.
1	2	The two-byte integer at offset 1 gives the start of the first freeblock on the page, or is zero if there are no freeblocks.
3	2	The two-byte integer at offset 3 gives the number of cells on the page.
5	2	The two-byte integer at offset 5 designates the start of the cell content area. A zero value for this integer is interpreted as 65536.
7	1	The one-byte integer at offset 7 gives the number of fragmented free bytes within the cell content area.
8	4	The four-byte page number at offset 8 is the right-most pointer. This value appears in the header of interior b-tree pages only and is omitted from all other pages.
The cell pointer array of a b-tree page immediately follows the b-tree page header. Let K be the number of cells on the btree. The cell pointer array consists of K 2-byte integer  cell pointers are arranged in key order with left-most cell (the cell with the smallest key) first and the right-most cell (the cell with the largest key) last.

Cell content is stored in the cell content region of the b-tree page. SQLite strives to place cells as far toward the end of the b-tree page as it can, in order to leave space for future growth of the cell pointer array. The area in between the last cell pointer array entry and the beginning of the first cell is the unallocated region.

If a page contains no cells (which is only possible for a root page of a table that contains no rows) then the offset to the cell content area will equal the page size minus the bytes of reserved space. If the database uses a 65536-byte page size and the reserved space is zero (the usual value for reserved space) then the cell content offset of an empty page wants to be 65536. However, that integer is too large to be stored in a 2-byte unsigned integer, so a value of 0 is used in its place.

A freeblock is a structure used to identify unallocated space within a b-tree page. Freeblocks are organized as a chain. The first 2 bytes of a freeblock are a big-endian integer which is the offset in the b-tree page of the next freeblock in the chain, or zero if the freeblock is the last on the chain. The third and fourth bytes of each freeblock form a big-endian integer which is the size of the freeblock in bytes, including the 4-byte header. Freeblocks are always connected in order of increasing offset. The second field of the b-tree page header is the offset of the first freeblock, or zero if there are no freeblocks on the page. In a well-formed b-tree page, there will always be at least one cell before the first freeblock.

A freeblock requires at least 4 bytes of space. If there is an isolated group of 1, 2, or 3 unused bytes within the cell content area, those bytes comprise a fragment. The total number of bytes in all fragments is stored in the fifth field of the b-tree page header. In a well-formed b-tree page, the total number of bytes in fragments may not exceed 60.

The total amount of free space on a b-tree page consists of the size of the unallocated region plus the total size of all freeblocks plus the number of fragmented free bytes. SQLite may from time to time reorganize a b-tree page so that there are no freeblocks or fragment bytes, all unused bytes are contained in the unallocated space region, and all cells are packed tightly at the end of the page. This is called "defragmenting" the b-tree page.

A variable-length integer or "varint" is a static Huffman encoding of 64-bit twos-complement integers that uses less space for small positive values. A varint is between 1 and 9 bytes in length. The varint consists of either zero or more bytes which have the high-order bit set followed by a single byte with the high-order bit clear, or nine bytes, whichever is shorter. The lower seven bits of each of the first eight bytes and all 8 bits of the ninth byte are used to reconstruct the 64-bit twos-complement integer. Varints are big-endian: bits taken from the earlier byte of the varint are more significant than bits taken from the later bytes.

The format of a cell depends on which kind of b-tree page the cell appears on. The following table shows the elements of a cell, in order of appearance, for the various b-tree page types.

Table B-Tree Leaf Cell (header 0x0d):

A varint which is the total number of bytes of payload, including any overflow
A varint which is the integer key, a.k.a. "rowid"
The initial portion of the payload that does not spill to overflow pages.
A 4-byte big-endian integer page number for the first page of the overflow page list - omitted if all payload fits on the b-tree page.
Table B-Tree Interior Cell (header 0x05):

A 4-byte big-endian page number which is the left child pointer.
A varint which is the integer key

*/

use std::fs::File;

use log::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::DbError;
use crate::page::{fetch_page, PageKind};
use crate::record::decode_record;
use crate::sql_data_types::Value;

/// Descends a table b-tree from a root page, producing every leaf record in
/// ascending row-id order.
///
/// Each interior cell carries its own left-child page index, read directly
/// off that cell; after all cell-pointer subtrees are visited, the walker
/// also recurses into the page's own right-child pointer — the step the
/// original traversal parsed but never took, silently dropping the final
/// subtree of any table spanning more than one page.
pub struct BTreeWalker<'f> {
    file: &'f mut File,
    page_size: usize,
}

impl<'f> BTreeWalker<'f> {
    pub fn new(file: &'f mut File, page_size: usize) -> Self {
        BTreeWalker { file, page_size }
    }

    pub fn walk(&mut self, root_page_no: u32) -> Result<Vec<(i64, Vec<Value>)>, DbError> {
        let mut out = Vec::new();
        self.walk_page(root_page_no, &mut out)?;
        Ok(out)
    }

    fn walk_page(&mut self, page_no: u32, out: &mut Vec<(i64, Vec<Value>)>) -> Result<(), DbError> {
        let page = fetch_page(self.file, page_no, self.page_size)?;

        match page.kind {
            PageKind::LeafTable => {
                trace!("leaf-table page {page_no}: {} cells", page.cell_count);
                for i in 0..page.cell_count as usize {
                    let mut cursor = ByteCursor::at(page.buf(), page.cell_offset(i));
                    let _payload_size = cursor.read_varint()?;
                    let row_id = cursor.read_varint()?.0;
                    let (values, _) = decode_record(&mut cursor)?;
                    out.push((row_id, values));
                }
                Ok(())
            }
            PageKind::InteriorTable => {
                debug!("interior-table page {page_no}: {} cells", page.cell_count);
                for i in 0..page.cell_count as usize {
                    let mut cursor = ByteCursor::at(page.buf(), page.cell_offset(i));
                    let left_child = cursor.read_u32()?;
                    let _key = cursor.read_varint()?;
                    self.walk_page(left_child, out)?;
                }
                if let Some(right_child) = page.right_child {
                    self.walk_page(right_child, out)?;
                }
                Ok(())
            }
            PageKind::LeafIndex => Err(DbError::UnsupportedPageKind(0x0A)),
            PageKind::InteriorIndex => Err(DbError::UnsupportedPageKind(0x02)),
        }
    }
}
