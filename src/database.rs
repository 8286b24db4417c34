/*
Metadata Info
Offset	Size	Description
0	16	The header string: "SQLite format 3\000"
16	2	The database page size in bytes. Must be a power of two between 512 and 32768 inclusive, or the value 1 representing a page size of 65536.
18	1	File format write version. 1 for legacy; 2 for WAL.
19	1	File format read version. 1 for legacy; 2 for WAL.
20	1	Bytes of unused "reserved" space at the end of each page. Usually 0.
21	1	Maximum embedded payload fraction. Must be 64.
22	1	Minimum embedded payload fraction. Must be 32.
23	1	Leaf payload fraction. Must be 32.
24	4	File change counter.
28	4	Size of the database file in pages. The "in-header database size".
32	4	Page number of the first freelist trunk page.
36	4	Total number of freelist pages.
40	4	The schema cookie.
44	4	The schema format number. Supported schema formats are 1, 2, 3, and 4.
48	4	Default page cache size.
52	4	The page number of the largest root b-tree page when in auto-vacuum or incremental-vacuum modes, or zero otherwise.
56	4	The database text encoding. A value of 1 means UTF-8. A value of 2 means UTF-16le. A value of 3 means UTF-16be.
60	4	The "user version" as read and set by the user_version pragma.
64	4	True (non-zero) for incremental-vacuum mode. False (zero) otherwise.
68	4	The "Application ID" set by PRAGMA application_id.
72	20	Reserved for expansion. Must be zero.
92	4	The version-valid-for number.
96	4	SQLITE_VERSION_NUMBER
*/

use std::fs::File;
use std::io::Read;

use crate::btree::BTreeWalker;
use crate::error::DbError;
use crate::page::fetch_page;
use crate::schema::SchemaResolver;

const VALID_PAGE_SIZES: &[u32] = &[512, 1024, 2048, 4096, 8192, 16384, 32768, 65536];

/// The fields of the 100-byte database header this engine actually needs.
/// Everything else in the header (write/read format version, freelist
/// bookkeeping, vacuum settings, application id) is write-path or
/// vacuum-path state with no bearing on a read-only query.
#[derive(Debug)]
pub struct DatabaseHeader {
    pub page_size: u32,
    pub reserved_bytes_per_page: u8,
}

impl DatabaseHeader {
    fn read_from(file: &mut File) -> Result<Self, DbError> {
        let mut buf = [0u8; 100];
        file.read_exact(&mut buf)?;

        let raw_page_size = u16::from_be_bytes([buf[16], buf[17]]);
        let page_size = if raw_page_size == 1 {
            65536
        } else {
            raw_page_size as u32
        };

        if !VALID_PAGE_SIZES.contains(&page_size) {
            return Err(DbError::MalformedHeader(page_size));
        }

        Ok(DatabaseHeader {
            page_size,
            reserved_bytes_per_page: buf[20],
        })
    }
}

pub struct Database {
    file: File,
    pub header: DatabaseHeader,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, DbError> {
        let mut file = File::open(path)?;
        let header = DatabaseHeader::read_from(&mut file)?;
        Ok(Database { file, header })
    }

    pub fn page_size(&self) -> usize {
        self.header.page_size as usize
    }

    /// The cell count of page 1's b-tree header: the number of entries in
    /// sqlite_schema, which `.dbinfo` reports as the table count.
    pub fn table_count(&mut self) -> Result<u16, DbError> {
        let page = fetch_page(&mut self.file, 1, self.page_size())?;
        Ok(page.cell_count)
    }

    pub fn schema_resolver(&mut self) -> SchemaResolver<'_> {
        SchemaResolver::new(&mut self.file, self.header.page_size as usize)
    }

    pub fn btree_walker(&mut self) -> BTreeWalker<'_> {
        BTreeWalker::new(&mut self.file, self.header.page_size as usize)
    }
}
