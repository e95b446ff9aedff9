//! Buffered legacy engine: BIFF8 workbook stream inside an OLE2 compound file.
//!
//! The whole sheet is kept in memory and serialized on save. Globals carry
//! the font, format, XF and style tables, one BOUNDSHEET and the shared string
//! table; the sheet substream carries column widths and one LABELSST (or
//! BLANK, for empty text) per cell.

use std::collections::{HashMap, HashSet};
use std::io::{Seek, Write};

use tabkit_io_table::{Result, TableError};

use crate::conf::N_NCOLS_XLS_MAX;
use crate::engine::{SheetEngine, SheetReadBack};
use crate::ole::write_compound_file;
use crate::spec::{EnumEngineKind, EnumWorkbookKind, SpecCellFormat, SpecStyleSet};
use crate::util::{derive_palette_index, validate_row_index};

const C_STREAM_NAME: &str = "Workbook";
/// Max payload of one BIFF8 record.
const N_LEN_RECORD_MAX: usize = 8224;
/// Excel cell text limit, in UTF-16 code units.
const N_LEN_CELL_TEXT_MAX: usize = 32_767;

const U16_BOF: u16 = 0x0809;
const U16_EOF: u16 = 0x000A;
const U16_CODEPAGE: u16 = 0x0042;
const U16_DATE1904: u16 = 0x0022;
const U16_WINDOW1: u16 = 0x003D;
const U16_FONT: u16 = 0x0031;
const U16_FORMAT: u16 = 0x041E;
const U16_XF: u16 = 0x00E0;
const U16_STYLE: u16 = 0x0293;
const U16_BOUNDSHEET: u16 = 0x0085;
const U16_SST: u16 = 0x00FC;
const U16_CONTINUE: u16 = 0x003C;
const U16_COLINFO: u16 = 0x007D;
const U16_DIMENSIONS: u16 = 0x0200;
const U16_LABELSST: u16 = 0x00FD;
const U16_BLANK: u16 = 0x0201;
const U16_WINDOW2: u16 = 0x023E;

const U16_BOF_GLOBALS: u16 = 0x0005;
const U16_BOF_WORKSHEET: u16 = 0x0010;
const U16_CODEPAGE_UTF16: u16 = 1200;

const U16_IDX_FONT_HEADER: u16 = 5;
const U16_IDX_FONT_BODY: u16 = 6;
const U16_IDX_XF_DEFAULT: u16 = 15;
const U16_IDX_XF_HEADER: u16 = 21;
const U16_IDX_XF_BODY: u16 = 22;

const C_FONT_NAME_DEFAULT: &str = "Arial";
const U16_FONT_HEIGHT_DEFAULT: u16 = 200;
const U16_COLOR_AUTO: u16 = 0x7FFF;
const U16_COLOR_BORDER: u16 = 0x08;
const U16_COLOR_PATTERN_FG: u16 = 0x40;
const U16_COLOR_PATTERN_BG: u16 = 0x41;

/// Built-in currency/accounting formats referenced by the built-in style XFs.
const L_FORMATS_BUILTIN: [(u16, &str); 8] = [
    (0x05, "\"$\"#,##0_);\\(\"$\"#,##0\\)"),
    (0x06, "\"$\"#,##0_);[Red]\\(\"$\"#,##0\\)"),
    (0x07, "\"$\"#,##0.00_);\\(\"$\"#,##0.00\\)"),
    (0x08, "\"$\"#,##0.00_);[Red]\\(\"$\"#,##0.00\\)"),
    (0x2A, "_(\"$\"* #,##0_);_(\"$\"* \\(#,##0\\);_(\"$\"* \"-\"_);_(@_)"),
    (0x29, "_(* #,##0_);_(* \\(#,##0\\);_(* \"-\"_);_(@_)"),
    (0x2C, "_(\"$\"* #,##0.00_);_(\"$\"* \\(#,##0.00\\);_(\"$\"* \"-\"??_);_(@_)"),
    (0x2B, "_(* #,##0.00_);_(* \\(#,##0.00\\);_(* \"-\"??_);_(@_)"),
];

/// `(xf index, built-in style id)` of the STYLE records.
const L_STYLES_BUILTIN: [(u16, u8); 6] = [
    (0x10, 3),
    (0x11, 6),
    (0x12, 4),
    (0x13, 7),
    (0x00, 0),
    (0x14, 5),
];

////////////////////////////////////////////////////////////////////////////////
// #region Engine

/// In-memory BIFF8 sheet builder.
#[derive(Debug, Clone)]
pub struct XlsBufferedEngine {
    c_sheet_name: String,
    style_set: SpecStyleSet,
    dict_widths: HashMap<usize, usize>,
    l_rows: Vec<Vec<String>>,
}

impl XlsBufferedEngine {
    pub fn new(c_sheet_name: &str, style_set: &SpecStyleSet) -> Self {
        Self {
            c_sheet_name: c_sheet_name.to_string(),
            style_set: style_set.clone(),
            dict_widths: HashMap::new(),
            l_rows: Vec::new(),
        }
    }

    /// Build the complete `Workbook` stream.
    pub fn derive_workbook_stream(&self) -> Vec<u8> {
        let (l_strings, n_refs_total) = self.derive_shared_strings();
        let dict_sst_idx: HashMap<&str, u32> = l_strings
            .iter()
            .enumerate()
            .map(|(n_idx, c_text)| (c_text.as_str(), n_idx as u32))
            .collect();

        let mut v_stream = Vec::new();
        write_record(&mut v_stream, U16_BOF, &derive_bof(U16_BOF_GLOBALS));
        write_record(&mut v_stream, U16_CODEPAGE, &U16_CODEPAGE_UTF16.to_le_bytes());
        write_record(&mut v_stream, U16_DATE1904, &0u16.to_le_bytes());
        write_record(&mut v_stream, U16_WINDOW1, &derive_window1());
        write_fonts(&mut v_stream, &self.style_set);
        for (n_idx_fmt, c_fmt) in L_FORMATS_BUILTIN {
            write_record(&mut v_stream, U16_FORMAT, &derive_format(n_idx_fmt, c_fmt));
        }
        write_xfs(&mut v_stream, &self.style_set);
        for (n_idx_xf, n_id_style) in L_STYLES_BUILTIN {
            let mut v_data = Vec::with_capacity(4);
            v_data.extend_from_slice(&(n_idx_xf | 0x8000).to_le_bytes());
            v_data.push(n_id_style);
            v_data.push(0xFF);
            write_record(&mut v_stream, U16_STYLE, &v_data);
        }

        let n_pos_boundsheet = v_stream.len() + 4;
        write_record(
            &mut v_stream,
            U16_BOUNDSHEET,
            &derive_boundsheet(&self.c_sheet_name),
        );
        write_sst(&mut v_stream, &l_strings, n_refs_total);
        write_record(&mut v_stream, U16_EOF, &[]);

        let n_pos_sheet = v_stream.len() as u32;
        v_stream[n_pos_boundsheet..n_pos_boundsheet + 4]
            .copy_from_slice(&n_pos_sheet.to_le_bytes());

        self.write_sheet_substream(&mut v_stream, &dict_sst_idx);
        v_stream
    }

    /// Distinct non-empty texts in first-use order, plus the total reference count.
    fn derive_shared_strings(&self) -> (Vec<String>, u32) {
        let mut l_strings = Vec::new();
        let mut set_seen: HashSet<&str> = HashSet::new();
        let mut n_refs_total = 0u32;
        for c_text in self.l_rows.iter().flatten() {
            if c_text.is_empty() {
                continue;
            }
            n_refs_total += 1;
            if set_seen.insert(c_text.as_str()) {
                l_strings.push(c_text.clone());
            }
        }
        (l_strings, n_refs_total)
    }

    fn write_sheet_substream(&self, v_stream: &mut Vec<u8>, dict_sst_idx: &HashMap<&str, u32>) {
        write_record(v_stream, U16_BOF, &derive_bof(U16_BOF_WORKSHEET));

        let mut l_widths: Vec<(&usize, &usize)> = self.dict_widths.iter().collect();
        l_widths.sort();
        for (n_idx_col, n_width_units) in l_widths {
            let mut v_data = Vec::with_capacity(12);
            v_data.extend_from_slice(&(*n_idx_col as u16).to_le_bytes());
            v_data.extend_from_slice(&(*n_idx_col as u16).to_le_bytes());
            v_data.extend_from_slice(&(*n_width_units as u16).to_le_bytes());
            v_data.extend_from_slice(&U16_IDX_XF_DEFAULT.to_le_bytes());
            v_data.extend_from_slice(&0u16.to_le_bytes());
            v_data.extend_from_slice(&0u16.to_le_bytes());
            write_record(v_stream, U16_COLINFO, &v_data);
        }

        let n_cols = self.l_rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut v_dims = Vec::with_capacity(14);
        v_dims.extend_from_slice(&0u32.to_le_bytes());
        v_dims.extend_from_slice(&(self.l_rows.len() as u32).to_le_bytes());
        v_dims.extend_from_slice(&0u16.to_le_bytes());
        v_dims.extend_from_slice(&(n_cols as u16).to_le_bytes());
        v_dims.extend_from_slice(&0u16.to_le_bytes());
        write_record(v_stream, U16_DIMENSIONS, &v_dims);

        for (n_idx_row, l_cells) in self.l_rows.iter().enumerate() {
            let n_idx_xf = if n_idx_row == 0 {
                U16_IDX_XF_HEADER
            } else {
                U16_IDX_XF_BODY
            };
            for (n_idx_col, c_text) in l_cells.iter().enumerate() {
                let mut v_data = Vec::with_capacity(10);
                v_data.extend_from_slice(&(n_idx_row as u16).to_le_bytes());
                v_data.extend_from_slice(&(n_idx_col as u16).to_le_bytes());
                v_data.extend_from_slice(&n_idx_xf.to_le_bytes());
                match dict_sst_idx.get(c_text.as_str()) {
                    Some(n_idx_sst) => {
                        v_data.extend_from_slice(&n_idx_sst.to_le_bytes());
                        write_record(v_stream, U16_LABELSST, &v_data);
                    }
                    None => write_record(v_stream, U16_BLANK, &v_data),
                }
            }
        }

        write_record(v_stream, U16_WINDOW2, &derive_window2());
        write_record(v_stream, U16_EOF, &[]);
    }
}

impl SheetEngine for XlsBufferedEngine {
    fn engine_kind(&self) -> EnumEngineKind {
        EnumEngineKind::BufferedXls
    }

    fn set_column_width(&mut self, n_idx_col: usize, n_width_units: usize) -> Result<()> {
        if n_idx_col >= N_NCOLS_XLS_MAX {
            return Err(TableError::Config(format!(
                "column index {n_idx_col} outside the .xls column range."
            )));
        }
        self.dict_widths
            .insert(n_idx_col, n_width_units.min(u16::MAX as usize));
        Ok(())
    }

    fn write_header_row(&mut self, l_labels: &[String]) -> Result<()> {
        if !self.l_rows.is_empty() {
            return Err(TableError::Config(
                "header row must be written before any data row.".to_string(),
            ));
        }
        validate_cell_texts(l_labels)?;
        self.l_rows.push(l_labels.to_vec());
        Ok(())
    }

    fn write_data_row(&mut self, n_idx_row_data: usize, l_cells: &[String]) -> Result<()> {
        validate_row_index(EnumWorkbookKind::Legacy, n_idx_row_data)?;
        validate_cell_texts(l_cells)?;
        self.l_rows.push(l_cells.to_vec());
        Ok(())
    }

    fn save_to_writer<W: Write + Seek + Send>(&mut self, sink: &mut W) -> Result<()> {
        let v_stream = self.derive_workbook_stream();
        write_compound_file(sink, C_STREAM_NAME, &v_stream)
            .map_err(|err| TableError::io("write .xls container", err))
    }
}

impl SheetReadBack for XlsBufferedEngine {
    fn cell_text(&self, n_idx_row: usize, n_idx_col: usize) -> Option<&str> {
        self.l_rows
            .get(n_idx_row)
            .and_then(|l_cells| l_cells.get(n_idx_col))
            .map(String::as_str)
    }

    fn n_rows(&self) -> usize {
        self.l_rows.len()
    }
}

fn validate_cell_texts(l_cells: &[String]) -> Result<()> {
    for (n_idx_col, c_text) in l_cells.iter().enumerate() {
        if c_text.encode_utf16().count() > N_LEN_CELL_TEXT_MAX {
            return Err(TableError::Limit(format!(
                "cell text in column {n_idx_col} exceeds {N_LEN_CELL_TEXT_MAX} characters."
            )));
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Records

fn write_record(v_stream: &mut Vec<u8>, n_type: u16, v_data: &[u8]) {
    debug_assert!(v_data.len() <= N_LEN_RECORD_MAX);
    v_stream.extend_from_slice(&n_type.to_le_bytes());
    v_stream.extend_from_slice(&(v_data.len() as u16).to_le_bytes());
    v_stream.extend_from_slice(v_data);
}

fn derive_bof(n_type_substream: u16) -> Vec<u8> {
    let mut v_data = Vec::with_capacity(16);
    v_data.extend_from_slice(&0x0600u16.to_le_bytes());
    v_data.extend_from_slice(&n_type_substream.to_le_bytes());
    v_data.extend_from_slice(&0x0DBBu16.to_le_bytes());
    v_data.extend_from_slice(&0x07CCu16.to_le_bytes());
    v_data.extend_from_slice(&0u32.to_le_bytes());
    v_data.extend_from_slice(&6u32.to_le_bytes());
    v_data
}

fn derive_window1() -> Vec<u8> {
    [
        0x0000u16, 0x0000, 0x3000, 0x1E00, 0x0038, 0x0000, 0x0000, 0x0001, 0x0258,
    ]
    .iter()
    .flat_map(|n| n.to_le_bytes())
    .collect()
}

fn derive_window2() -> Vec<u8> {
    let mut v_data = Vec::with_capacity(18);
    v_data.extend_from_slice(&0x06B6u16.to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&(U16_COLOR_PATTERN_FG as u32).to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&0u32.to_le_bytes());
    v_data
}

/// `cch` (u16) + flags + characters; compressed when every char fits in Latin-1.
fn derive_unicode_string(c_text: &str) -> Vec<u8> {
    let (u8_flags, v_chars, n_cch) = derive_string_chars(c_text);
    let mut v_data = Vec::with_capacity(3 + v_chars.len());
    v_data.extend_from_slice(&(n_cch as u16).to_le_bytes());
    v_data.push(u8_flags);
    v_data.extend_from_slice(&v_chars);
    v_data
}

/// `cch` (u8) + flags + characters.
fn derive_short_unicode_string(c_text: &str) -> Vec<u8> {
    let c_text: String = c_text.chars().take(u8::MAX as usize).collect();
    let (u8_flags, v_chars, n_cch) = derive_string_chars(&c_text);
    let mut v_data = Vec::with_capacity(2 + v_chars.len());
    v_data.push(n_cch.min(u8::MAX as usize) as u8);
    v_data.push(u8_flags);
    v_data.extend_from_slice(&v_chars);
    v_data
}

fn derive_string_chars(c_text: &str) -> (u8, Vec<u8>, usize) {
    if c_text.chars().all(|c| (c as u32) <= 0xFF) {
        let v_chars: Vec<u8> = c_text.chars().map(|c| c as u8).collect();
        let n_cch = v_chars.len();
        (0x00, v_chars, n_cch)
    } else {
        let l_units: Vec<u16> = c_text.encode_utf16().collect();
        let v_chars = l_units.iter().flat_map(|n| n.to_le_bytes()).collect();
        (0x01, v_chars, l_units.len())
    }
}

fn derive_format(n_idx_fmt: u16, c_fmt: &str) -> Vec<u8> {
    let mut v_data = n_idx_fmt.to_le_bytes().to_vec();
    v_data.extend_from_slice(&derive_unicode_string(c_fmt));
    v_data
}

fn derive_boundsheet(c_sheet_name: &str) -> Vec<u8> {
    let mut v_data = Vec::new();
    v_data.extend_from_slice(&0u32.to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&derive_short_unicode_string(c_sheet_name));
    v_data
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FontsAndFormats

fn derive_font(
    c_font_name: &str,
    n_height_twips: u16,
    if_bold: bool,
    if_italic: bool,
    n_color: u16,
) -> Vec<u8> {
    let mut v_data = Vec::new();
    v_data.extend_from_slice(&n_height_twips.to_le_bytes());
    v_data.extend_from_slice(&(if if_italic { 0x0002u16 } else { 0 }).to_le_bytes());
    v_data.extend_from_slice(&n_color.to_le_bytes());
    v_data.extend_from_slice(&(if if_bold { 700u16 } else { 400 }).to_le_bytes());
    v_data.extend_from_slice(&0u16.to_le_bytes());
    v_data.extend_from_slice(&[0, 0, 0, 0]);
    v_data.extend_from_slice(&derive_short_unicode_string(c_font_name));
    v_data
}

fn derive_font_from_format(fmt: &SpecCellFormat) -> Vec<u8> {
    let n_height_twips = fmt
        .font_size
        .and_then(|n_pt| u16::try_from(n_pt.clamp(1, 409) * 20).ok())
        .unwrap_or(U16_FONT_HEIGHT_DEFAULT);
    let n_color = fmt
        .font_color
        .as_deref()
        .and_then(derive_palette_index)
        .unwrap_or(U16_COLOR_AUTO);
    derive_font(
        fmt.font_name.as_deref().unwrap_or(C_FONT_NAME_DEFAULT),
        n_height_twips,
        fmt.bold.unwrap_or(false),
        fmt.italic.unwrap_or(false),
        n_color,
    )
}

/// Fonts 0..=3 are defaults, index 4 does not exist, header is 5 and body 6.
fn write_fonts(v_stream: &mut Vec<u8>, style_set: &SpecStyleSet) {
    let v_font_default = derive_font(
        C_FONT_NAME_DEFAULT,
        U16_FONT_HEIGHT_DEFAULT,
        false,
        false,
        U16_COLOR_AUTO,
    );
    for _ in 0..4 {
        write_record(v_stream, U16_FONT, &v_font_default);
    }
    write_record(v_stream, U16_FONT, &derive_font_from_format(&style_set.header));
    write_record(v_stream, U16_FONT, &derive_font_from_format(&style_set.body));
}

/// Attribute bits of one XF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpecXfRecord {
    n_idx_font: u16,
    n_idx_fmt: u16,
    if_style: bool,
    u8_align: u8,
    u8_used_attrs: u8,
    u8_border: u8,
    n_color_border: u16,
    u8_pattern: u8,
    n_color_fg: u16,
    n_color_bg: u16,
}

impl SpecXfRecord {
    fn new_default(n_idx_font: u16, n_idx_fmt: u16, if_style: bool, u8_used_attrs: u8) -> Self {
        Self {
            n_idx_font,
            n_idx_fmt,
            if_style,
            u8_align: 0x20,
            u8_used_attrs,
            u8_border: 0,
            n_color_border: 0,
            u8_pattern: 0,
            n_color_fg: U16_COLOR_PATTERN_FG,
            n_color_bg: U16_COLOR_PATTERN_BG,
        }
    }

    fn from_format(fmt: &SpecCellFormat, n_idx_font: u16) -> Self {
        let u8_halign = fmt.align.as_deref().map_or(0, derive_xls_halign);
        let u8_valign = fmt.valign.as_deref().map_or(2, derive_xls_valign);
        let u8_border = fmt
            .border
            .filter(|n_style| (0..=13).contains(n_style))
            .unwrap_or(0) as u8;
        let n_color_fill = fmt.bg_color.as_deref().and_then(derive_palette_index);

        Self {
            n_idx_font,
            n_idx_fmt: 0,
            if_style: false,
            u8_align: u8_halign | (u8_valign << 4),
            u8_used_attrs: 0xF8,
            u8_border,
            n_color_border: if u8_border > 0 { U16_COLOR_BORDER } else { 0 },
            u8_pattern: u8::from(n_color_fill.is_some()),
            n_color_fg: n_color_fill.unwrap_or(U16_COLOR_PATTERN_FG),
            n_color_bg: U16_COLOR_PATTERN_BG,
        }
    }

    fn derive_bytes(&self) -> Vec<u8> {
        let n_border = self.u8_border as u16;
        let n_color = self.n_color_border & 0x7F;

        let mut v_data = Vec::with_capacity(20);
        v_data.extend_from_slice(&self.n_idx_font.to_le_bytes());
        v_data.extend_from_slice(&self.n_idx_fmt.to_le_bytes());
        let n_type_prot: u16 = if self.if_style { 0xFFF5 } else { 0x0001 };
        v_data.extend_from_slice(&n_type_prot.to_le_bytes());
        v_data.push(self.u8_align);
        v_data.push(0);
        v_data.push(0);
        v_data.push(self.u8_used_attrs);
        let n_lines = n_border | (n_border << 4) | (n_border << 8) | (n_border << 12);
        v_data.extend_from_slice(&n_lines.to_le_bytes());
        v_data.extend_from_slice(&(n_color | (n_color << 7)).to_le_bytes());
        let n_top_bottom = (n_color as u32)
            | ((n_color as u32) << 7)
            | ((self.u8_pattern as u32 & 0x3F) << 26);
        v_data.extend_from_slice(&n_top_bottom.to_le_bytes());
        let n_fill = (self.n_color_fg & 0x7F) | ((self.n_color_bg & 0x7F) << 7);
        v_data.extend_from_slice(&n_fill.to_le_bytes());
        v_data
    }
}

/// 15 style XFs, the default cell XF (15), built-in style XFs 16..=20,
/// then the header (21) and body (22) cell XFs.
fn write_xfs(v_stream: &mut Vec<u8>, style_set: &SpecStyleSet) {
    for n_idx_xf in 0..15u16 {
        let n_idx_font = match n_idx_xf {
            1 | 2 => 1,
            3 | 4 => 2,
            _ => 0,
        };
        let u8_used = if n_idx_xf == 0 { 0x00 } else { 0xF4 };
        let xf = SpecXfRecord::new_default(n_idx_font, 0, true, u8_used);
        write_record(v_stream, U16_XF, &xf.derive_bytes());
    }

    let xf_cell_default = SpecXfRecord::new_default(0, 0, false, 0x00);
    write_record(v_stream, U16_XF, &xf_cell_default.derive_bytes());

    for n_idx_fmt in [0x2B, 0x29, 0x2C, 0x2A, 0x09] {
        let xf = SpecXfRecord::new_default(1, n_idx_fmt, true, 0xF8);
        write_record(v_stream, U16_XF, &xf.derive_bytes());
    }

    let xf_header = SpecXfRecord::from_format(&style_set.header, U16_IDX_FONT_HEADER);
    write_record(v_stream, U16_XF, &xf_header.derive_bytes());
    let xf_body = SpecXfRecord::from_format(&style_set.body, U16_IDX_FONT_BODY);
    write_record(v_stream, U16_XF, &xf_body.derive_bytes());
}

fn derive_xls_halign(align: &str) -> u8 {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => 1,
        "center" => 2,
        "right" => 3,
        "fill" => 4,
        "justify" => 5,
        "center_across" => 6,
        "distributed" => 7,
        _ => 0,
    }
}

fn derive_xls_valign(valign: &str) -> u8 {
    match valign.trim().to_ascii_lowercase().as_str() {
        "top" => 0,
        "vcenter" | "vertical_center" => 1,
        "vjustify" | "vertical_justify" => 3,
        "vdistributed" | "vertical_distributed" => 4,
        _ => 2,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SharedStringTable

/// Splits SST payload into records of at most [`N_LEN_RECORD_MAX`] bytes.
struct SstChunker {
    l_records: Vec<Vec<u8>>,
}

impl SstChunker {
    fn new() -> Self {
        Self {
            l_records: vec![Vec::with_capacity(N_LEN_RECORD_MAX)],
        }
    }

    fn current(&mut self) -> &mut Vec<u8> {
        if self.l_records.is_empty() {
            self.l_records.push(Vec::with_capacity(N_LEN_RECORD_MAX));
        }
        let n_last = self.l_records.len() - 1;
        &mut self.l_records[n_last]
    }

    fn n_available(&mut self) -> usize {
        N_LEN_RECORD_MAX - self.current().len()
    }

    fn start_record(&mut self) {
        self.l_records.push(Vec::with_capacity(N_LEN_RECORD_MAX));
    }
}

/// Write SST and its CONTINUE records.
///
/// A string header never splits; character data that continues in a new
/// record is preceded by the string's compression flag byte.
fn write_sst(v_stream: &mut Vec<u8>, l_strings: &[String], n_refs_total: u32) {
    let mut chunker = SstChunker::new();
    chunker.current().extend_from_slice(&n_refs_total.to_le_bytes());
    chunker
        .current()
        .extend_from_slice(&(l_strings.len() as u32).to_le_bytes());

    for c_text in l_strings {
        let (u8_flags, v_chars, n_cch) = derive_string_chars(c_text);
        let n_len_char = if u8_flags == 0x01 { 2 } else { 1 };

        if chunker.n_available() < 3 + n_len_char {
            chunker.start_record();
        }
        chunker
            .current()
            .extend_from_slice(&(n_cch as u16).to_le_bytes());
        chunker.current().push(u8_flags);

        let mut v_rest = &v_chars[..];
        loop {
            let n_take = (chunker.n_available() / n_len_char * n_len_char).min(v_rest.len());
            chunker.current().extend_from_slice(&v_rest[..n_take]);
            v_rest = &v_rest[n_take..];
            if v_rest.is_empty() {
                break;
            }
            chunker.start_record();
            chunker.current().push(u8_flags);
        }
    }

    for (n_idx, v_record) in chunker.l_records.iter().enumerate() {
        let n_type = if n_idx == 0 { U16_SST } else { U16_CONTINUE };
        write_record(v_stream, n_type, v_record);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
