//! The single-table database façade: open, close, insert, select.

use std::path::Path;

use tracing::info;

use crate::errors::Error;
use crate::storage::btree;
use crate::storage::cursor::Cursor;
use crate::storage::node::{self, NodeType};
use crate::storage::pager::Pager;
use crate::storage::row::Row;

pub const ROOT_PAGE_NUM: u32 = 0;

pub struct Table {
    pub pager: Pager,
    pub root_page_num: u32,
}

impl Table {
    pub fn open(path: &Path) -> Result<Table, Error> {
        let mut pager = Pager::open(path)?;
        if pager.num_pages() == 0 {
            let root = pager.get_mut(ROOT_PAGE_NUM)?;
            node::initialize_leaf(root);
            node::set_is_root(root, true);
        }
        info!(?path, "opened table");
        Ok(Table {
            pager,
            root_page_num: ROOT_PAGE_NUM,
        })
    }

    /// Flushes every page to disk. The table is dropped immediately after;
    /// there's no separate close handle since ownership already guarantees
    /// the file isn't touched again once this returns.
    pub fn close(mut self) -> Result<(), Error> {
        self.pager.flush_all()?;
        info!("closed table");
        Ok(())
    }

    pub fn insert(&mut self, row: Row) -> Result<(), Error> {
        let key = row.id;
        let mut cursor = Cursor::find(self, key)?;

        let num_cells = {
            let page = cursor.table.pager.get(cursor.page_num)?;
            node::leaf_num_cells(page)
        };
        if cursor.cell_num < num_cells {
            let page = cursor.table.pager.get(cursor.page_num)?;
            if node::leaf_key(page, cursor.cell_num) == key {
                return Err(Error::DuplicateKey);
            }
        }

        btree::insert(&mut cursor, &row)
    }

    pub fn select(&mut self) -> Result<Vec<Row>, Error> {
        let mut rows = Vec::new();
        let mut cursor = Cursor::start(self)?;
        while !cursor.end_of_table {
            let value = cursor.value()?;
            rows.push(Row::deserialize(value));
            cursor.advance()?;
        }
        Ok(rows)
    }

    /// Renders the tree for the `.btree` meta-command: each node indented by
    /// depth, leaves listing their keys, internal nodes recursing into each
    /// child in order.
    pub fn render_tree(&mut self) -> Result<String, Error> {
        let mut out = String::new();
        self.render_node(self.root_page_num, 0, &mut out)?;
        Ok(out)
    }

    fn render_node(&mut self, page_num: u32, indent: usize, out: &mut String) -> Result<(), Error> {
        let pad = "  ".repeat(indent);

        enum Shape {
            Leaf(Vec<u32>),
            Internal(Vec<u32>, u32),
        }

        let shape = {
            let page = self.pager.get(page_num)?;
            match node::node_type(page) {
                NodeType::Leaf => {
                    let num_cells = node::leaf_num_cells(page);
                    let keys = (0..num_cells).map(|i| node::leaf_key(page, i)).collect();
                    Shape::Leaf(keys)
                }
                NodeType::Internal => {
                    let num_keys = node::internal_num_keys(page);
                    let children = (0..num_keys).map(|i| node::internal_child(page, i)).collect();
                    Shape::Internal(children, node::internal_right_child(page))
                }
            }
        };

        match shape {
            Shape::Leaf(keys) => {
                out.push_str(&format!("{pad}- leaf (size {})\n", keys.len()));
                for key in keys {
                    out.push_str(&format!("{pad}  - {key}\n"));
                }
            }
            Shape::Internal(children, right_child) => {
                out.push_str(&format!("{pad}- internal (size {})\n", children.len()));
                for child in children {
                    self.render_node(child, indent + 1, out)?;
                }
                self.render_node(right_child, indent + 1, out)?;
            }
        }
        Ok(())
    }
}
