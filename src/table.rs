//! Tabular time-series I/O.
//!
//! Trials are exchanged as delimited text with one header row of column
//! names and one row per sample. Tabs are the native delimiter; commas and
//! runs of whitespace are accepted when the header contains no tab. Empty
//! fields read as NaN and NaN is written as an empty field, so ragged
//! columns survive a round trip.
//!
//! Column names follow `<landmark>_<side>_<axis>`, e.g. `hip_l_y`,
//! `for_r_z`, `cop_l_x`, `mom_r_y`, with `neck_x` for the unsided neck.

use crate::{
    dynamics::{JointKinetics, JointLoad},
    events::GaitEvents,
    kinematics::JointAngles,
    trial::{Bilateral, ForcePlateFrame, Joint, LegMarkers, MarkerFrame, PlateReading, Side},
    Error, Result,
};
use log::debug;
use nalgebra::Vector3;
use ndarray::{Array2, ArrayView1};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const AXES: [&str; 3] = ["x", "y", "z"];

/// Column indices of an x/y/z triple
type VectorColumns = [usize; 3];

/// Named numeric columns over sample rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    data: Array2<f64>,
}

impl Table {
    /// Create a table from column names and a row-major matrix
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix width differs from the number of names
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Result<Self> {
        if data.ncols() != columns.len() {
            return Err(Error::shape_mismatch("table data columns", columns.len(), data.ncols()));
        }
        Ok(Self { columns, data })
    }

    /// Create a table from rows of values
    ///
    /// # Errors
    ///
    /// Returns an error if any row width differs from the number of names
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = columns.len();
        let mut flat = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.len() != width {
                return Err(Error::shape_mismatch("table row", width, row.len()));
            }
            flat.extend_from_slice(row);
        }

        let data = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| Error::Parse(format!("Cannot shape table: {e}")))?;
        Self::new(columns, data)
    }

    /// Parse delimited text
    ///
    /// # Errors
    ///
    /// Returns an error if the text has no header, a row has the wrong
    /// number of fields, or a field is not a number
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Read delimited text from a reader
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or malformed content
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines().enumerate();

        let (delimiter, columns) = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    let delimiter = Delimiter::detect(&line);
                    let columns: Vec<String> = delimiter.split(&line).map(str::to_string).collect();
                    break (delimiter, columns);
                }
                None => return Err(Error::Parse("Table has no header row".to_string())),
            }
        };

        let mut rows = Vec::new();
        for (index, line) in lines {
            let line = line?;
            // A tab-separated row of empty fields is all NaN, not blank
            if line.chars().all(|c| c == ' ' || c == '\r') {
                continue;
            }

            let line_number = index + 1;
            let fields: Vec<&str> = delimiter.split(&line).collect();
            if fields.len() != columns.len() {
                return Err(Error::Parse(format!(
                    "Line {line_number}: expected {} fields, got {}",
                    columns.len(),
                    fields.len()
                )));
            }

            let row = fields
                .iter()
                .zip(&columns)
                .map(|(field, column)| parse_field(field, column, line_number))
                .collect::<Result<Vec<f64>>>()?;
            rows.push(row);
        }

        debug!("Read table with {} rows and {} columns", rows.len(), columns.len());
        Self::from_rows(columns, &rows)
    }

    /// Read a table file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is malformed
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of sample rows
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Values of a named column
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let index = self.column_index(name)?;
        Ok(self.data.column(index))
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Locate `<prefix>_x/_y/_z`, trying each alias prefix in turn
    fn vector_columns(&self, prefixes: &[&str]) -> Result<VectorColumns> {
        let lookup = |prefix: &str| -> Result<VectorColumns> {
            let [x, y, z] = AXES.map(|axis| self.column_index(&format!("{prefix}_{axis}")));
            Ok([x?, y?, z?])
        };

        let mut first_error = None;
        for prefix in prefixes {
            match lookup(prefix) {
                Ok(columns) => return Ok(columns),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| Error::MissingColumn("<no column prefix given>".to_string())))
    }

    fn vector(&self, row: usize, columns: VectorColumns) -> Vector3<f64> {
        let [x, y, z] = columns;
        Vector3::new(self.data[[row, x]], self.data[[row, y]], self.data[[row, z]])
    }

    /// Write as tab-separated text
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self.columns.join("\t"))?;
        for row in self.data.rows() {
            let fields: Vec<String> = row
                .iter()
                .map(|value| if value.is_nan() { String::new() } else { value.to_string() })
                .collect();
            writeln!(writer, "{}", fields.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write to a file as tab-separated text
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written
    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }

    /// Interpret the table as marker trajectories
    ///
    /// Requires `neck`, `hip`, `knee`, `ankle` and `toe` triples for both
    /// sides; `toe2_l` / `toe2_r` are accepted for the toe landmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing
    pub fn to_markers(&self) -> Result<Vec<MarkerFrame>> {
        let neck = self.vector_columns(&["neck"])?;
        let left = self.leg_columns(Side::Left)?;
        let right = self.leg_columns(Side::Right)?;

        let leg = |row: usize, [hip, knee, ankle, toe]: [VectorColumns; 4]| LegMarkers {
            hip: self.vector(row, hip),
            knee: self.vector(row, knee),
            ankle: self.vector(row, ankle),
            toe: self.vector(row, toe),
        };

        Ok((0..self.nrows())
            .map(|row| MarkerFrame {
                neck: self.vector(row, neck),
                left: leg(row, left),
                right: leg(row, right),
            })
            .collect())
    }

    fn leg_columns(&self, side: Side) -> Result<[VectorColumns; 4]> {
        let s = side.suffix();
        Ok([
            self.vector_columns(&[format!("hip_{s}").as_str()])?,
            self.vector_columns(&[format!("knee_{s}").as_str()])?,
            self.vector_columns(&[format!("ankle_{s}").as_str()])?,
            self.vector_columns(&[format!("toe_{s}").as_str(), format!("toe2_{s}").as_str()])?,
        ])
    }

    /// Interpret the table as left/right force plate recordings
    ///
    /// Requires `for`, `cop` and `mom` triples for both sides.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing
    pub fn to_force_plates(&self) -> Result<Vec<ForcePlateFrame>> {
        let plate_columns = |side: Side| -> Result<[VectorColumns; 3]> {
            let s = side.suffix();
            Ok([
                self.vector_columns(&[format!("for_{s}").as_str()])?,
                self.vector_columns(&[format!("cop_{s}").as_str()])?,
                self.vector_columns(&[format!("mom_{s}").as_str()])?,
            ])
        };
        let left = plate_columns(Side::Left)?;
        let right = plate_columns(Side::Right)?;

        let plate = |row: usize, [force, cop, moment]: [VectorColumns; 3]| PlateReading {
            force: self.vector(row, force),
            center_of_pressure: self.vector(row, cop),
            moment: self.vector(row, moment),
        };

        Ok((0..self.nrows())
            .map(|row| Bilateral::new(plate(row, left), plate(row, right)))
            .collect())
    }
}

/// Field separator of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Tab,
    Comma,
    Whitespace,
}

impl Delimiter {
    fn detect(header: &str) -> Self {
        if header.contains('\t') {
            Delimiter::Tab
        } else if header.contains(',') {
            Delimiter::Comma
        } else {
            Delimiter::Whitespace
        }
    }

    fn split<'a>(self, line: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self {
            Delimiter::Tab => Box::new(line.split('\t').map(str::trim)),
            Delimiter::Comma => Box::new(line.split(',').map(str::trim)),
            Delimiter::Whitespace => Box::new(line.split_whitespace()),
        }
    }
}

fn parse_field(field: &str, column: &str, line_number: usize) -> Result<f64> {
    if field.is_empty() {
        return Ok(f64::NAN);
    }
    field.parse::<f64>().map_err(|_| {
        Error::Parse(format!(
            "Line {line_number}, column {column}: invalid number {field:?}"
        ))
    })
}

fn vector_column_names(prefix: &str) -> impl Iterator<Item = String> + '_ {
    AXES.iter().map(move |axis| format!("{prefix}_{axis}"))
}

/// Force and moment tables of the joint kinetics
///
/// Both tables start with a `sample` column holding the original sample
/// index, followed by `<joint>_<side>_<axis>` columns, left leg first.
///
/// # Errors
///
/// Returns an error if a table cannot be assembled
#[allow(clippy::cast_precision_loss)]
pub fn kinetics_tables(kinetics: &JointKinetics) -> Result<(Table, Table)> {
    let mut columns = vec!["sample".to_string()];
    for side in Side::BOTH {
        for joint in Joint::ALL {
            columns.extend(vector_column_names(&format!("{}_{}", joint.name(), side.suffix())));
        }
    }

    let build = |component: fn(&JointLoad) -> Vector3<f64>| -> Vec<Vec<f64>> {
        kinetics
            .samples()
            .iter()
            .map(|sample| {
                let mut row = vec![sample.sample as f64];
                for side in Side::BOTH {
                    for joint in Joint::ALL {
                        row.extend(component(sample.loads.side(side).joint(joint)).iter());
                    }
                }
                row
            })
            .collect()
    };

    let forces = Table::from_rows(columns.clone(), &build(|load: &JointLoad| load.force))?;
    let moments = Table::from_rows(columns, &build(|load: &JointLoad| load.moment))?;
    Ok((forces, moments))
}

/// Gait events as four ragged columns, padded with NaN
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn events_table(events: &GaitEvents) -> Table {
    let series = [
        &events.left.heel_strikes,
        &events.left.toe_offs,
        &events.right.heel_strikes,
        &events.right.toe_offs,
    ];
    let columns: Vec<String> = ["heel_strike_l", "toe_off_l", "heel_strike_r", "toe_off_r"]
        .iter()
        .map(|name| (*name).to_string())
        .collect();

    let nrows = series.iter().map(|s| s.len()).max().unwrap_or(0);
    let data = Array2::from_shape_fn((nrows, series.len()), |(row, col)| {
        series[col].get(row).map_or(f64::NAN, |&sample| sample as f64)
    });

    Table { columns, data }
}

/// Joint angles table, left leg first
///
/// # Errors
///
/// Returns an error if the table cannot be assembled
pub fn angles_table(angles: &[JointAngles]) -> Result<Table> {
    let mut columns = Vec::new();
    for side in Side::BOTH {
        let s = side.suffix();
        columns.extend([
            format!("hip_{s}_flex_ext"),
            format!("hip_{s}_abd_add"),
            format!("knee_{s}_flex_ext"),
            format!("ankle_{s}_plan_dors"),
        ]);
    }

    let rows: Vec<Vec<f64>> = angles
        .iter()
        .map(|sample| {
            Side::BOTH
                .iter()
                .flat_map(|&side| {
                    let leg = sample.side(side);
                    [leg.hip_flexion, leg.hip_abduction, leg.knee_flexion, leg.ankle_plantarflexion]
                })
                .collect()
        })
        .collect();

    Table::from_rows(columns, &rows)
}
