/// One entry of the static city catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityEntry {
    pub id: u64,
    pub local_name: &'static str,
    pub english_name: &'static str,
}

impl CityEntry {
    pub fn label(&self) -> String {
        format!("{} ({})", self.local_name, self.english_name)
    }

    fn matches(&self, term: &str) -> bool {
        self.local_name.to_lowercase().contains(term)
            || self.english_name.to_lowercase().contains(term)
    }
}

/// Built-in catalog, loaded once and never mutated.
#[rustfmt::skip]
pub const CITY_CATALOG: &[CityEntry] = &[
    CityEntry { id: 1835848, local_name: "서울", english_name: "Seoul" },
    CityEntry { id: 1838524, local_name: "부산", english_name: "Busan" },
    CityEntry { id: 1835327, local_name: "대구", english_name: "Daegu" },
    CityEntry { id: 1843564, local_name: "인천", english_name: "Incheon" },
    CityEntry { id: 1841811, local_name: "광주", english_name: "Gwangju" },
    CityEntry { id: 1835235, local_name: "대전", english_name: "Daejeon" },
    CityEntry { id: 1835553, local_name: "수원", english_name: "Suwon-si" },
    CityEntry { id: 1846326, local_name: "창원", english_name: "Changwon" },
    CityEntry { id: 1846266, local_name: "제주", english_name: "Jeju City" },
];

/// Combobox state machine over the catalog: pure transitions, no I/O. The
/// visible list is the full catalog while no filter term is active.
pub struct CityPicker {
    catalog: &'static [CityEntry],
    filter: String,
    visible: Vec<CityEntry>,
    selected: Option<usize>,
    open: bool,
}

impl Default for CityPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl CityPicker {
    pub fn new() -> Self {
        Self::with_catalog(CITY_CATALOG)
    }

    pub fn with_catalog(catalog: &'static [CityEntry]) -> Self {
        Self {
            catalog,
            filter: String::new(),
            visible: catalog.to_vec(),
            selected: None,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn visible(&self) -> &[CityEntry] {
        &self.visible
    }

    /// Recompute the visible list: entries whose local or English name
    /// contains `term` case-insensitively. Always resets the selection.
    pub fn filter(&mut self, term: &str) {
        self.filter = term.to_string();
        let needle = term.to_lowercase();
        self.visible = if needle.is_empty() {
            self.catalog.to_vec()
        } else {
            self.catalog
                .iter()
                .copied()
                .filter(|city| city.matches(&needle))
                .collect()
        };
        self.selected = None;
        self.open = true;
    }

    /// Move the highlight by `delta` (+1/-1), opening the list first if it
    /// was closed; wraps circularly. No-op when nothing is visible.
    pub fn move_selection(&mut self, delta: i32) {
        if !self.open {
            self.open = true;
        }

        let len = self.visible.len();
        if len == 0 {
            return;
        }

        let current = self.selected.map_or(-1, |i| i as i64);
        let mut next = current + i64::from(delta);
        if next < 0 {
            next = len as i64 - 1;
        } else if next >= len as i64 {
            next = 0;
        }
        self.selected = Some(next as usize);
    }

    /// Currently highlighted entry. An index that no longer fits the visible
    /// list yields None rather than a wrong row.
    pub fn selected(&self) -> Option<&CityEntry> {
        let index = self.selected?;
        self.visible.get(index)
    }

    /// Exact case-insensitive match on either name, for free-text submits
    /// made without a highlighted row.
    pub fn find_by_name(&self, term: &str) -> Option<&CityEntry> {
        let needle = term.to_lowercase();
        self.catalog.iter().find(|city| {
            city.local_name.to_lowercase() == needle
                || city.english_name.to_lowercase() == needle
        })
    }

    /// Full reset: filter, visible list, and selection, not just a visual
    /// hide.
    pub fn close(&mut self) {
        self.filter.clear();
        self.visible = self.catalog.to_vec();
        self.selected = None;
        self.open = false;
    }
}
