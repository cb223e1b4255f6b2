use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A column heading plus how its cells line up. Counts and money read
/// better right-aligned.
pub type Column<'a> = (&'a str, Align);

pub fn print_table<const N: usize>(columns: [Column<'_>; N], rows: &[[String; N]]) {
    print!("{}", render_table(columns, rows));
}

fn render_table<const N: usize>(columns: [Column<'_>; N], rows: &[[String; N]]) -> String {
    let mut widths = columns.map(|(heading, _)| heading.len());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; N]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(columns.iter().zip(widths))
            .map(|(cell, ((_, align), width))| match align {
                Align::Left => format!("{cell:<width$}"),
                Align::Right => format!("{cell:>width$}"),
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(columns.map(|(heading, _)| heading));
    out.push_str(&line(widths.map(|w| "-".repeat(w)).each_ref().map(String::as_str)));
    for row in rows {
        out.push_str(&line(row.each_ref().map(String::as_str)));
    }
    out
}
