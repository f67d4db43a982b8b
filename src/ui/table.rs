//! ui::table
//!
//! Plain-text tables for `hc show`.
//!
//! Rows are sorted case-insensitively by name. Columns are left aligned and
//! padded to the widest cell, with a dashed rule under the header.

use crate::core::summary::CubeSummary;
use crate::ui::output::format_bytes;

/// A table of string cells.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing cells render empty; extra cells are dropped.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(Into::into)
            .take(self.headers.len())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers[col])
                    .chain(self.rows.iter().map(|row| &row[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut lines = vec![line(&self.headers), rule.join("  ")];
        lines.extend(self.rows.iter().map(|row| line(row)));
        lines.join("\n")
    }
}

fn sorted_by_name<'a, T>(items: &'a [T], name: impl Fn(&T) -> &str) -> Vec<&'a T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by_key(|item| name(item).to_uppercase());
    sorted
}

/// Dimension name, description, global size and extents.
pub fn dimension_table(summary: &CubeSummary) -> Table {
    let mut table = Table::new(["Dimension Name", "Description", "Global Size", "Extents"]);
    for dim in sorted_by_name(&summary.dimensions, |d| d.name.as_str()) {
        table.push_row([
            dim.name.clone(),
            dim.description.clone(),
            dim.global_size.to_string(),
            format!("({}, {})", dim.lower_extent, dim.upper_extent),
        ]);
    }
    table
}

/// Array name, size, dtype and symbolic shape, closed by the local memory
/// usage row.
pub fn array_table(summary: &CubeSummary) -> Table {
    let mut table = Table::new(["Array Name", "Size", "Type", "Shape"]);
    for array in sorted_by_name(&summary.arrays, |a| a.name.as_str()) {
        let shape: Vec<String> = array.shape.iter().map(ToString::to_string).collect();
        table.push_row([
            array.name.clone(),
            format_bytes(array.bytes),
            array.dtype.to_string(),
            format!("({})", shape.join(",")),
        ]);
    }
    table.push_row([
        "Local Memory Usage".to_string(),
        format_bytes(summary.total_bytes),
    ]);
    table
}

/// Property name, dtype, current and default value.
pub fn property_table(summary: &CubeSummary) -> Table {
    let mut table = Table::new(["Property Name", "Type", "Value", "Default Value"]);
    for property in sorted_by_name(&summary.properties, |p| p.name.as_str()) {
        table.push_row([
            property.name.clone(),
            property.dtype.to_string(),
            property.value.to_string(),
            property.default.to_string(),
        ]);
    }
    table
}

/// All non-empty sections of a cube summary.
pub fn render_summary(summary: &CubeSummary) -> String {
    let mut sections = Vec::new();

    if !summary.dimensions.is_empty() {
        sections.push(format!(
            "Registered Dimensions:\n{}",
            dimension_table(summary).render()
        ));
    }
    if !summary.arrays.is_empty() {
        sections.push(format!(
            "Registered Arrays:\n{}",
            array_table(summary).render()
        ));
    }
    if !summary.properties.is_empty() {
        sections.push(format!(
            "Registered Properties:\n{}",
            property_table(summary).render()
        ));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cube::HyperCube;
    use crate::core::types::DType;
    use crate::shape;

    fn summary() -> CubeSummary {
        let mut cube = HyperCube::new();
        cube.register_dimension("ntime", 10, "Timesteps").unwrap();
        cube.register_dimension("Nbl", 3, "Baselines").unwrap();
        cube.register_dimension("na", 3, "Antennas").unwrap();
        cube.register_array("vis", shape!["ntime", "Nbl"].unwrap(), DType::Float32, "")
            .unwrap();
        cube.register_array("ANT", shape!["na", 3].unwrap(), DType::Float64, "")
            .unwrap();
        cube.summary().unwrap()
    }

    #[test]
    fn render_pads_columns() {
        let mut table = Table::new(["A", "Long header"]);
        table.push_row(["wide cell", "x"]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "A          Long header");
        assert_eq!(lines[1], "---------  -----------");
        assert_eq!(lines[2], "wide cell  x");
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new(["a", "b", "c"]);
        table.push_row(["1"]);
        assert_eq!(table.len(), 1);
        assert!(table.render().ends_with("1"));
    }

    #[test]
    fn dimensions_sorted_case_insensitively() {
        let table = dimension_table(&summary());
        let names: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["na", "Nbl", "ntime"]);
        assert_eq!(table.rows[2][3], "(0, 10)");
    }

    #[test]
    fn arrays_end_with_memory_usage() {
        let table = array_table(&summary());
        let names: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["ANT", "vis", "Local Memory Usage"]);
        assert_eq!(table.rows[1][3], "(ntime,Nbl)");
        assert_eq!(table.rows[1][2], "float32");
    }

    #[test]
    fn summary_sections() {
        let rendered = render_summary(&summary());
        assert!(rendered.starts_with("Registered Dimensions:"));
        assert!(rendered.contains("Registered Arrays:"));
        assert!(!rendered.contains("Registered Properties:"));
    }
}
