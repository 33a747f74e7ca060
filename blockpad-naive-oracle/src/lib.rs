//! A naive, simple oracle implementation for differential testing.
//!
//! Each page keeps its blocks in a plain `Vec` in display order, so there
//! are no ranks to maintain. Ids are supplied by the caller (taken from the
//! store under test) so both sides can be compared directly.
use blockpad::{BlockId, PageId};

#[derive(Debug, Clone, PartialEq, Eq)]
struct OraclePage {
    id: PageId,
    title: String,
    blocks: Vec<(BlockId, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pages: Vec<OraclePage>,
    current: Option<PageId>,
    active: Option<BlockId>,
}

impl Workspace {
    pub fn new(first_page: PageId, title: &str) -> Self {
        Self {
            pages: vec![OraclePage {
                id: first_page,
                title: title.to_string(),
                blocks: Vec::new(),
            }],
            current: Some(first_page),
            active: None,
        }
    }

    fn page_mut(&mut self, id: PageId) -> Option<&mut OraclePage> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    fn find_block(&self, id: BlockId) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(p, page)| {
            page.blocks
                .iter()
                .position(|(block, _)| *block == id)
                .map(|b| (p, b))
        })
    }

    pub fn add_block(&mut self, id: BlockId, index: Option<usize>) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(page) = self.page_mut(current) else {
            return false;
        };
        let at = index.unwrap_or(page.blocks.len()).min(page.blocks.len());
        page.blocks.insert(at, (id, String::new()));
        true
    }

    pub fn update_block(&mut self, id: BlockId, content: &str) -> bool {
        match self.find_block(id) {
            Some((p, b)) => {
                self.pages[p].blocks[b].1 = content.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete_block(&mut self, id: BlockId) -> bool {
        match self.find_block(id) {
            Some((p, b)) => {
                self.pages[p].blocks.remove(b);
                if self.active == Some(id) {
                    self.active = None;
                }
                true
            }
            None => false,
        }
    }

    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        let Some(current) = self.current else {
            return false;
        };
        let Some(page) = self.page_mut(current) else {
            return false;
        };
        if from >= page.blocks.len() {
            return false;
        }
        let moved = page.blocks.remove(from);
        let to = to.min(page.blocks.len());
        page.blocks.insert(to, moved);
        true
    }

    pub fn set_active_block(&mut self, id: Option<BlockId>) -> bool {
        if let Some(id) = id
            && self.find_block(id).is_none()
        {
            return false;
        }
        self.active = id;
        true
    }

    pub fn add_page(&mut self, id: PageId, title: &str) {
        self.pages.push(OraclePage {
            id,
            title: title.to_string(),
            blocks: Vec::new(),
        });
        self.current = Some(id);
        self.active = None;
    }

    pub fn delete_page(&mut self, id: PageId) -> bool {
        let Some(idx) = self.pages.iter().position(|page| page.id == id) else {
            return false;
        };
        if self.pages.len() == 1 {
            return false;
        }
        let removed = self.pages.remove(idx);
        if let Some(active) = self.active
            && removed.blocks.iter().any(|(block, _)| *block == active)
        {
            self.active = None;
        }
        if self.current == Some(id) {
            self.current = self.pages.first().map(|page| page.id);
            self.active = None;
        }
        true
    }

    pub fn set_current_page(&mut self, id: PageId) -> bool {
        if !self.pages.iter().any(|page| page.id == id) {
            return false;
        }
        self.current = Some(id);
        self.active = None;
        true
    }

    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|page| page.id).collect()
    }

    pub fn page_title(&self, id: PageId) -> Option<&str> {
        self.pages
            .iter()
            .find(|page| page.id == id)
            .map(|page| page.title.as_str())
    }

    pub fn page_sequence(&self, id: PageId) -> Vec<BlockId> {
        self.pages
            .iter()
            .find(|page| page.id == id)
            .map(|page| page.blocks.iter().map(|(block, _)| *block).collect())
            .unwrap_or_default()
    }

    pub fn content(&self, id: BlockId) -> Option<&str> {
        self.find_block(id)
            .map(|(p, b)| self.pages[p].blocks[b].1.as_str())
    }

    pub fn current_page(&self) -> Option<PageId> {
        self.current
    }

    pub fn active_block(&self) -> Option<BlockId> {
        self.active
    }

    /// Ids of every block, page by page.
    pub fn all_blocks(&self) -> Vec<BlockId> {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter().map(|(block, _)| *block))
            .collect()
    }
}
