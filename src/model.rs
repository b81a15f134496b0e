use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Error;

pub const MIN_FONT_SIZE: u32 = 8;
/// Largest font size Word accepts, in points.
pub const MAX_FONT_SIZE: u32 = 1638;
/// Word's table limits.
pub const MAX_TABLE_COLUMNS: usize = 63;
pub const MAX_TABLE_ROWS: usize = 32767;

/// Tab marker as it arrives in block text: a backslash followed by `t`.
pub const TAB_MARKER: &str = "\\t";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    #[serde(alias = "both")]
    Justify,
}

/// Hard break appended to every run of a paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakType {
    #[serde(alias = "textWrapping")]
    Line,
    Page,
    Column,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub font_size: u32,
    pub font_family: String,
    /// RGB hex, 3 or 6 digits, no leading '#'.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    #[serde(alias = "alignment")]
    pub text_align: Alignment,
    #[serde(default)]
    pub break_type: Option<BreakType>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_size: 11,
            font_family: "Calibri".into(),
            color: "000000".into(),
            bold: false,
            italic: false,
            underline: false,
            text_align: Alignment::Left,
            break_type: None,
        }
    }
}

impl Style {
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&self.font_size) {
            return Err(Error::Validation(format!(
                "'fontSize' has to be between {MIN_FONT_SIZE} and {MAX_FONT_SIZE} but is {}",
                self.font_size
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(Error::Validation("'fontFamily' cannot be empty".into()));
        }
        if normalize_hex_color(&self.color).is_none() {
            return Err(Error::Validation(format!(
                "'color' is not a hex string: '{}'",
                self.color
            )));
        }
        Ok(())
    }

    /// Six-digit uppercase color, expanding the 3-digit shorthand.
    pub fn hex_color(&self) -> String {
        normalize_hex_color(&self.color).unwrap_or_else(|| "000000".into())
    }
}

fn normalize_hex_color(val: &str) -> Option<String> {
    if !val.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match val.len() {
        6 => Some(val.to_ascii_uppercase()),
        3 => Some(
            val.chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
                .to_ascii_uppercase(),
        ),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ContentBlock {
    pub text: String,
    pub style: Style,
}

impl ContentBlock {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Name inside a `${name}` wrapper, if the text is exactly one such wrapper
/// and the name carries a file extension.
pub fn picture_reference(text: &str) -> Option<&str> {
    let name = text.trim().strip_prefix("${")?.strip_suffix('}')?;
    if name.contains(['{', '}']) {
        return None;
    }
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(name)
}

/// What a block's text turns into, decided once when the build plan is made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    PlainText,
    /// Text containing at least one tab marker.
    TabRun,
    /// `${name}` reference into the request's picture map.
    PictureRef(String),
}

impl BlockKind {
    pub fn classify(text: &str) -> Self {
        if let Some(name) = picture_reference(text) {
            BlockKind::PictureRef(name.to_string())
        } else if text.contains(TAB_MARKER) {
            BlockKind::TabRun
        } else {
            BlockKind::PlainText
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRegion {
    pub num_columns: usize,
    pub num_rows: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl TableRegion {
    pub fn new(num_columns: usize, num_rows: usize, start_index: usize, end_index: usize) -> Self {
        Self {
            num_columns,
            num_rows,
            start_index,
            end_index,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index <= self.end_index
    }

    pub fn cell_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    pub fn capacity(&self) -> usize {
        self.num_columns.saturating_mul(self.num_rows)
    }
}

/// Ordinal of a region in start-index order. Stable for one build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);

/// Validated, disjoint regions sorted by `start_index`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRegions {
    regions: Vec<TableRegion>,
}

impl TableRegions {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&TableRegion> {
        self.regions.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &TableRegion)> {
        self.regions.iter().enumerate().map(|(i, r)| (RegionId(i), r))
    }

    /// First region whose `[start_index, end_index]` holds `index`.
    pub fn region_for(&self, index: usize) -> Option<(RegionId, &TableRegion)> {
        self.iter().find(|(_, r)| r.contains(index))
    }

    pub fn is_table_index(&self, index: usize) -> bool {
        self.region_for(index).is_some()
    }

    fn validated(mut regions: Vec<TableRegion>, content_len: usize) -> Result<Self, Error> {
        for r in &regions {
            if r.num_columns < 1 || r.num_rows < 1 {
                return Err(Error::Validation(format!(
                    "table region at {} needs at least one row and one column",
                    r.start_index
                )));
            }
            if r.num_columns > MAX_TABLE_COLUMNS || r.num_rows > MAX_TABLE_ROWS {
                return Err(Error::Validation(format!(
                    "table region at {} is {}x{}, at most {MAX_TABLE_ROWS}x{MAX_TABLE_COLUMNS} is allowed",
                    r.start_index, r.num_rows, r.num_columns
                )));
            }
            if r.end_index < r.start_index {
                return Err(Error::Validation(format!(
                    "table region 'endIndex' {} is before 'startIndex' {}",
                    r.end_index, r.start_index
                )));
            }
            if r.end_index >= content_len {
                return Err(Error::Validation(format!(
                    "table region 'endIndex' {} is outside the content (length {content_len})",
                    r.end_index
                )));
            }
        }

        regions.sort_by_key(|r| r.start_index);

        for pair in regions.windows(2) {
            if pair[0].end_index >= pair[1].start_index {
                return Err(Error::OverlappingTableRegions {
                    first_start: pair[0].start_index,
                    first_end: pair[0].end_index,
                    second_start: pair[1].start_index,
                    second_end: pair[1].end_index,
                });
            }
        }

        if let Some(r) = regions.iter().find(|r| r.capacity() < r.cell_count()) {
            return Err(Error::TableRegionTooSmall {
                start_index: r.start_index,
                end_index: r.end_index,
                num_rows: r.num_rows,
                num_columns: r.num_columns,
                needed: r.cell_count(),
                capacity: r.capacity(),
            });
        }

        Ok(Self { regions })
    }
}

fn default_num_columns() -> i32 {
    1
}

fn default_file_name() -> String {
    "document.docx".into()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// `None` slots are rejected as malformed content when the build reaches them.
    pub content: Vec<Option<ContentBlock>>,
    #[serde(default, alias = "tableConfigs")]
    pub table_regions: Vec<TableRegion>,
    #[serde(default)]
    pub landscape: bool,
    /// Out-of-range values are clamped to 1 by the section planner.
    #[serde(default = "default_num_columns")]
    pub num_columns: i32,
    #[serde(default)]
    pub num_single_column_lines: usize,
    #[serde(skip)]
    pub pictures: HashMap<String, Vec<u8>>,
    #[serde(default = "default_file_name")]
    pub docx_file_name: String,
}

impl BuildRequest {
    pub fn new(content: Vec<ContentBlock>) -> Self {
        Self {
            content: content.into_iter().map(Some).collect(),
            table_regions: Vec::new(),
            landscape: false,
            num_columns: default_num_columns(),
            num_single_column_lines: 0,
            pictures: HashMap::new(),
            docx_file_name: default_file_name(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_table_regions(mut self, regions: Vec<TableRegion>) -> Self {
        self.table_regions = regions;
        self
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn with_columns(mut self, num_columns: i32) -> Self {
        self.num_columns = num_columns;
        self
    }

    pub fn with_single_column_lines(mut self, lines: usize) -> Self {
        self.num_single_column_lines = lines;
        self
    }

    pub fn with_picture(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.pictures.insert(name.into(), bytes);
        self
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.docx_file_name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Checks request shape and table geometry. Returns the sorted regions.
    pub fn validate(&self) -> Result<TableRegions, Error> {
        if self.content.is_empty() {
            return Err(Error::Validation("'content' cannot be empty".into()));
        }
        for block in self.content.iter().flatten() {
            block.style.validate()?;
        }
        if self.docx_file_name.trim().is_empty() {
            return Err(Error::Validation("'docxFileName' cannot be empty".into()));
        }
        if !self.docx_file_name.ends_with(".docx") {
            return Err(Error::Validation(format!(
                "wrong format of 'docxFileName' '{}', only '.docx' permitted",
                self.docx_file_name
            )));
        }
        if self.num_single_column_lines > self.content.len() - 1 {
            return Err(Error::Validation(format!(
                "'numSingleColumnLines' {} is beyond the last content index {}",
                self.num_single_column_lines,
                self.content.len() - 1
            )));
        }
        TableRegions::validated(self.table_regions.clone(), self.content.len())
    }
}

/// Destination of one content index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Header,
    Footer,
    TableCell {
        region: RegionId,
        row: usize,
        col: usize,
    },
    Body,
    /// Blank first or last block: nothing is emitted for it.
    Omitted,
}

/// Non-fatal conditions recovered during a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildWarning {
    PictureInsideTable { index: usize },
    ColumnsClamped { requested: i32 },
    TemplateUnreadable { reason: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::PictureInsideTable { index } => {
                write!(f, "picture at index {index} cannot be placed inside a table, added as text")
            }
            BuildWarning::ColumnsClamped { requested } => {
                write!(f, "'numColumns' must be between 1 and 3 but is {requested}, using 1")
            }
            BuildWarning::TemplateUnreadable { reason } => {
                write!(f, "template could not be read ({reason}), using an empty document")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl PictureFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpg",
            PictureFormat::Gif => "gif",
            PictureFormat::Bmp => "bmp",
            PictureFormat::Tiff => "tiff",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
            PictureFormat::Gif => "image/gif",
            PictureFormat::Bmp => "image/bmp",
            PictureFormat::Tiff => "image/tiff",
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmbeddedPicture {
    pub name: String,
    pub data: Vec<u8>,
    pub format: PictureFormat,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub width_emu: u64,
    pub height_emu: u64,
}
