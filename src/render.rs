use crate::types::{LayoutResult, Segment, SegmentKind};

/// Inner width of the bar, in columns.
const BAR_WIDTH: f64 = 80.0;
const BAR_HEIGHT: usize = 2;

/// Draws a layout as a three-line ASCII bar scaled to 80 columns.
///
/// Margins are filled with `.`, pieces carry their length when it fits, and
/// limit markers are drawn as a column of `!`.
pub fn render_layout(result: &LayoutResult, total_length: f64) -> String {
    if !total_length.is_finite() || total_length <= 0.0 {
        return String::new();
    }
    let scale = BAR_WIDTH / total_length;
    let grid_w = BAR_WIDTH as usize;

    let mut grid = vec![vec![' '; grid_w + 1]; BAR_HEIGHT + 1];

    draw_rect(&mut grid, 0, grid_w);

    for seg in &result.segments {
        let sx = to_col(seg.start, scale, grid_w);
        let ex = to_col(seg.end, scale, grid_w);

        if seg.kind == SegmentKind::Limit {
            for row in grid.iter_mut() {
                row[sx] = '!';
            }
            continue;
        }
        if ex <= sx {
            continue;
        }

        draw_rect(&mut grid, sx, ex - sx);

        match seg.kind {
            SegmentKind::Margin => fill_interior(&mut grid, sx, ex, '.'),
            SegmentKind::Piece => label_interior(&mut grid, sx, ex, &piece_label(seg)),
            SegmentKind::Limit => {}
        }
    }

    let mut out = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn to_col(pos: f64, scale: f64, grid_w: usize) -> usize {
    ((pos * scale).round().max(0.0) as usize).min(grid_w)
}

fn piece_label(seg: &Segment) -> String {
    format!("{:.0}", seg.length)
}

fn fill_interior(grid: &mut [Vec<char>], sx: usize, ex: usize, ch: char) {
    let row = &mut grid[BAR_HEIGHT / 2];
    for cell in row.iter_mut().take(ex).skip(sx + 1) {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

fn label_interior(grid: &mut [Vec<char>], sx: usize, ex: usize, label: &str) {
    let inner = ex - sx - 1;
    let chars: Vec<char> = label.chars().collect();
    if chars.len() > inner {
        return;
    }
    let start = sx + 1 + (inner - chars.len()) / 2;
    let row = &mut grid[BAR_HEIGHT / 2];
    for (i, &ch) in chars.iter().enumerate() {
        row[start + i] = ch;
    }
}

#[allow(clippy::needless_range_loop)]
fn draw_rect(grid: &mut [Vec<char>], x: usize, w: usize) {
    let rows = grid.len();
    let cols = grid[0].len();

    // Horizontal edges
    for i in x..=x + w {
        if i < cols {
            for y in [0, rows - 1] {
                grid[y][i] = if grid[y][i] == '|' || grid[y][i] == '+' {
                    '+'
                } else {
                    '-'
                };
            }
        }
    }

    // Vertical edges
    for j in 0..rows {
        for cx in [x, x + w] {
            if cx < cols {
                grid[j][cx] = if grid[j][cx] == '-' || grid[j][cx] == '+' {
                    '+'
                } else {
                    '|'
                };
            }
        }
    }

    // Corners
    for cx in [x, x + w] {
        for cy in [0, rows - 1] {
            if cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}
