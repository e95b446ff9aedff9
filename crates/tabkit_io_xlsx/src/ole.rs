//! Minimal OLE2 compound file writer holding a single stream.
//!
//! Layout, in sector order: stream sectors, one directory sector, FAT sectors,
//! then DIFAT sectors when more than 109 FAT sectors are needed. The stream is
//! padded to the mini-stream cutoff so no mini FAT is ever written.

use std::io::Write;

const V_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const N_LEN_SECTOR: usize = 512;
const N_LEN_DIR_ENTRY: usize = 128;
const N_LEN_MINI_STREAM_CUTOFF: usize = 4096;
const N_FAT_IDS_IN_HEADER: usize = 109;
const N_IDS_PER_SECTOR: usize = N_LEN_SECTOR / 4;

const U32_FREESECT: u32 = 0xFFFF_FFFF;
const U32_ENDOFCHAIN: u32 = 0xFFFF_FFFE;
const U32_FATSECT: u32 = 0xFFFF_FFFD;
const U32_DIFSECT: u32 = 0xFFFF_FFFC;
const U32_NOSTREAM: u32 = 0xFFFF_FFFF;

const U8_TYPE_STREAM: u8 = 2;
const U8_TYPE_ROOT: u8 = 5;
const U8_COLOR_BLACK: u8 = 1;

/// Sector counts of one compound file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecOleLayout {
    pub n_stream_sectors: usize,
    pub n_fat_sectors: usize,
    pub n_difat_sectors: usize,
}

impl SpecOleLayout {
    /// Plan sectors for a stream of `n_len_stream` bytes (already padded).
    pub fn plan(n_len_stream: usize) -> Self {
        let n_stream_sectors = n_len_stream.div_ceil(N_LEN_SECTOR);
        let mut n_fat_sectors = 1;
        let mut n_difat_sectors = 0;
        loop {
            let n_total = n_stream_sectors + 1 + n_fat_sectors + n_difat_sectors;
            let n_fat_needed = n_total.div_ceil(N_IDS_PER_SECTOR);
            let n_difat_needed = n_fat_needed
                .saturating_sub(N_FAT_IDS_IN_HEADER)
                .div_ceil(N_IDS_PER_SECTOR - 1);
            if n_fat_needed == n_fat_sectors && n_difat_needed == n_difat_sectors {
                break;
            }
            n_fat_sectors = n_fat_needed;
            n_difat_sectors = n_difat_needed;
        }
        Self {
            n_stream_sectors,
            n_fat_sectors,
            n_difat_sectors,
        }
    }

    fn n_idx_dir(&self) -> u32 {
        self.n_stream_sectors as u32
    }

    fn n_idx_fat_first(&self) -> u32 {
        self.n_idx_dir() + 1
    }

    fn n_idx_difat_first(&self) -> u32 {
        self.n_idx_fat_first() + self.n_fat_sectors as u32
    }
}

/// Write `v_stream` as the only stream, named `c_stream_name`, of a compound file.
pub fn write_compound_file<W: Write>(
    sink: &mut W,
    c_stream_name: &str,
    v_stream: &[u8],
) -> std::io::Result<()> {
    let n_len_stream = v_stream.len().max(N_LEN_MINI_STREAM_CUTOFF);
    let layout = SpecOleLayout::plan(n_len_stream);

    sink.write_all(&derive_header(&layout))?;

    sink.write_all(v_stream)?;
    let n_len_padding = layout.n_stream_sectors * N_LEN_SECTOR - v_stream.len();
    sink.write_all(&vec![0u8; n_len_padding])?;

    sink.write_all(&derive_directory_sector(c_stream_name, n_len_stream as u32))?;

    for v_sector in derive_fat_sectors(&layout) {
        sink.write_all(&v_sector)?;
    }
    for v_sector in derive_difat_sectors(&layout) {
        sink.write_all(&v_sector)?;
    }
    Ok(())
}

fn derive_header(layout: &SpecOleLayout) -> [u8; N_LEN_SECTOR] {
    let mut v_header = [0u8; N_LEN_SECTOR];
    v_header[0..8].copy_from_slice(&V_MAGIC);
    v_header[24..26].copy_from_slice(&0x003Eu16.to_le_bytes());
    v_header[26..28].copy_from_slice(&3u16.to_le_bytes());
    v_header[28..30].copy_from_slice(&0xFFFEu16.to_le_bytes());
    v_header[30..32].copy_from_slice(&9u16.to_le_bytes());
    v_header[32..34].copy_from_slice(&6u16.to_le_bytes());
    // csectDir stays 0 for 512-byte sectors.
    v_header[44..48].copy_from_slice(&(layout.n_fat_sectors as u32).to_le_bytes());
    v_header[48..52].copy_from_slice(&layout.n_idx_dir().to_le_bytes());
    v_header[56..60].copy_from_slice(&(N_LEN_MINI_STREAM_CUTOFF as u32).to_le_bytes());
    v_header[60..64].copy_from_slice(&U32_ENDOFCHAIN.to_le_bytes());

    let n_idx_difat_first = if layout.n_difat_sectors > 0 {
        layout.n_idx_difat_first()
    } else {
        U32_ENDOFCHAIN
    };
    v_header[68..72].copy_from_slice(&n_idx_difat_first.to_le_bytes());
    v_header[72..76].copy_from_slice(&(layout.n_difat_sectors as u32).to_le_bytes());

    for n_slot in 0..N_FAT_IDS_IN_HEADER {
        let n_id = if n_slot < layout.n_fat_sectors {
            layout.n_idx_fat_first() + n_slot as u32
        } else {
            U32_FREESECT
        };
        let n_offset = 76 + n_slot * 4;
        v_header[n_offset..n_offset + 4].copy_from_slice(&n_id.to_le_bytes());
    }
    v_header
}

fn derive_directory_entry(
    c_name: &str,
    u8_type: u8,
    n_idx_child: u32,
    n_idx_start: u32,
    n_len_stream: u32,
) -> [u8; N_LEN_DIR_ENTRY] {
    let mut v_entry = [0u8; N_LEN_DIR_ENTRY];
    let l_units: Vec<u16> = c_name.encode_utf16().take(31).collect();
    for (n_idx, n_unit) in l_units.iter().enumerate() {
        v_entry[n_idx * 2..n_idx * 2 + 2].copy_from_slice(&n_unit.to_le_bytes());
    }
    let n_len_name = ((l_units.len() + 1) * 2) as u16;
    v_entry[64..66].copy_from_slice(&n_len_name.to_le_bytes());
    v_entry[66] = u8_type;
    v_entry[67] = U8_COLOR_BLACK;
    v_entry[68..72].copy_from_slice(&U32_NOSTREAM.to_le_bytes());
    v_entry[72..76].copy_from_slice(&U32_NOSTREAM.to_le_bytes());
    v_entry[76..80].copy_from_slice(&n_idx_child.to_le_bytes());
    v_entry[116..120].copy_from_slice(&n_idx_start.to_le_bytes());
    v_entry[120..124].copy_from_slice(&n_len_stream.to_le_bytes());
    v_entry
}

fn derive_unused_directory_entry() -> [u8; N_LEN_DIR_ENTRY] {
    let mut v_entry = [0u8; N_LEN_DIR_ENTRY];
    v_entry[68..80].copy_from_slice(&[0xFF; 12]);
    v_entry
}

fn derive_directory_sector(c_stream_name: &str, n_len_stream: u32) -> Vec<u8> {
    let mut v_sector = Vec::with_capacity(N_LEN_SECTOR);
    v_sector.extend_from_slice(&derive_directory_entry(
        "Root Entry",
        U8_TYPE_ROOT,
        1,
        U32_ENDOFCHAIN,
        0,
    ));
    v_sector.extend_from_slice(&derive_directory_entry(
        c_stream_name,
        U8_TYPE_STREAM,
        U32_NOSTREAM,
        0,
        n_len_stream,
    ));
    while v_sector.len() < N_LEN_SECTOR {
        v_sector.extend_from_slice(&derive_unused_directory_entry());
    }
    v_sector
}

fn derive_fat_sectors(layout: &SpecOleLayout) -> Vec<Vec<u8>> {
    let mut l_fat: Vec<u32> = (1..layout.n_stream_sectors as u32).collect();
    l_fat.push(U32_ENDOFCHAIN);
    l_fat.push(U32_ENDOFCHAIN);
    l_fat.extend(std::iter::repeat_n(U32_FATSECT, layout.n_fat_sectors));
    l_fat.extend(std::iter::repeat_n(U32_DIFSECT, layout.n_difat_sectors));
    l_fat.resize(layout.n_fat_sectors * N_IDS_PER_SECTOR, U32_FREESECT);

    l_fat
        .chunks(N_IDS_PER_SECTOR)
        .map(|chunk| chunk.iter().flat_map(|n_id| n_id.to_le_bytes()).collect())
        .collect()
}

fn derive_difat_sectors(layout: &SpecOleLayout) -> Vec<Vec<u8>> {
    let l_fat_ids_rest: Vec<u32> = (N_FAT_IDS_IN_HEADER..layout.n_fat_sectors)
        .map(|n_slot| layout.n_idx_fat_first() + n_slot as u32)
        .collect();

    (0..layout.n_difat_sectors)
        .map(|n_idx_difat| {
            let mut l_ids: Vec<u32> = l_fat_ids_rest
                .iter()
                .skip(n_idx_difat * (N_IDS_PER_SECTOR - 1))
                .take(N_IDS_PER_SECTOR - 1)
                .copied()
                .collect();
            l_ids.resize(N_IDS_PER_SECTOR - 1, U32_FREESECT);
            l_ids.push(if n_idx_difat + 1 < layout.n_difat_sectors {
                layout.n_idx_difat_first() + n_idx_difat as u32 + 1
            } else {
                U32_ENDOFCHAIN
            });
            l_ids.iter().flat_map(|n_id| n_id.to_le_bytes()).collect()
        })
        .collect()
}
