use std::fmt::Write as _;

use fcs_types::{DataMatrix, GroupBy};
use fcs_wire::WireError;

use crate::error::DecodeError;
use crate::plan::DecodePlan;

/// Cursor over the DATA segment.
///
/// Reads one event (`$PAR` values) at a time and jumps the skip stride
/// after each one. The caller guarantees the bytes exist; a short buffer
/// still surfaces as [`WireError::UnexpectedEof`] rather than a panic.
struct EventCursor<'a> {
  buf: &'a [u8],
  pos: usize,
  plan: &'a DecodePlan,
}

impl<'a> EventCursor<'a> {
  fn new(buf: &'a [u8], begin_data: usize, plan: &'a DecodePlan) -> Self {
    Self {
      buf,
      pos: begin_data,
      plan,
    }
  }

  /// Fill `row` with the next event's values.
  fn read_event(&mut self, row: &mut [f64]) -> Result<(), WireError> {
    let width = self.plan.element.width();
    for value in &mut *row {
      *value = self.plan.element.read(self.buf, self.pos, self.plan.byte_order)?;
      self.pos += width;
    }
    self.pos = self.pos.saturating_add(self.plan.skip_bytes);
    Ok(())
  }
}

/// Decode the DATA segment starting at `begin_data` according to `plan`.
///
/// # Errors
///
/// Returns [`DecodeError::SegmentOutOfBounds`] if `buf` ends before
/// [`DecodePlan::data_end`].
pub(crate) fn read_matrix(
  buf: &[u8],
  begin_data: usize,
  plan: &DecodePlan,
) -> Result<DataMatrix, DecodeError> {
  let end = plan.data_end(begin_data);
  if end > buf.len() {
    return Err(DecodeError::SegmentOutOfBounds {
      segment: "DATA",
      begin: begin_data,
      end,
      available: buf.len(),
    });
  }

  if plan.events == 0 {
    return Ok(empty_matrix(plan));
  }

  let mut cursor = EventCursor::new(buf, begin_data, plan);
  match plan.group_by {
    GroupBy::ByEvent => by_event(&mut cursor, plan),
    GroupBy::ByParam => by_param(&mut cursor, plan),
  }
}

/// No events: nothing to read, and no per-event buffers. A by-param
/// matrix still has one (empty) row per parameter.
fn empty_matrix(plan: &DecodePlan) -> DataMatrix {
  let numbers = plan.data_format.wants_numbers().then(Vec::new);
  let strings = plan.data_format.wants_strings().then(|| match plan.group_by {
    GroupBy::ByEvent => Vec::new(),
    GroupBy::ByParam => vec![String::from("[]"); plan.parameters],
  });
  DataMatrix::new(plan.group_by, 0, plan.parameters, numbers, strings)
}

/// One row per event, rendered `[v1,v2,...]`.
fn by_event(cursor: &mut EventCursor<'_>, plan: &DecodePlan) -> Result<DataMatrix, DecodeError> {
  let (events, parameters) = (plan.events, plan.parameters);
  let mut numbers = plan
    .data_format
    .wants_numbers()
    .then(|| Vec::with_capacity(events * parameters));
  let mut strings = plan
    .data_format
    .wants_strings()
    .then(|| Vec::with_capacity(events));

  let mut row = vec![0.0; parameters];
  for _ in 0..events {
    cursor.read_event(&mut row)?;

    if let Some(numbers) = numbers.as_mut() {
      numbers.extend_from_slice(&row);
    }
    if let Some(strings) = strings.as_mut() {
      let mut line = String::with_capacity(parameters * 10 + 2);
      line.push('[');
      for (p, &value) in row.iter().enumerate() {
        if p > 0 {
          line.push(',');
        }
        push_value(&mut line, value, plan.decimals);
      }
      line.push(']');
      strings.push(line);
    }
  }

  Ok(DataMatrix::new(GroupBy::ByEvent, events, parameters, numbers, strings))
}

/// One row per parameter. Values are read in file order (event-major) and
/// scattered into a pre-sized parameter-major buffer.
fn by_param(cursor: &mut EventCursor<'_>, plan: &DecodePlan) -> Result<DataMatrix, DecodeError> {
  let (events, parameters) = (plan.events, plan.parameters);
  let mut numbers = plan
    .data_format
    .wants_numbers()
    .then(|| vec![0.0; events * parameters]);
  let mut strings = plan
    .data_format
    .wants_strings()
    .then(|| vec![String::from("["); parameters]);

  let mut row = vec![0.0; parameters];
  for e in 0..events {
    cursor.read_event(&mut row)?;

    if let Some(numbers) = numbers.as_mut() {
      for (p, &value) in row.iter().enumerate() {
        numbers[p * events + e] = value;
      }
    }
    if let Some(strings) = strings.as_mut() {
      for (line, &value) in strings.iter_mut().zip(&row) {
        if e > 0 {
          line.push(',');
          if plan.max_per_line > 0 && e % plan.max_per_line == 0 {
            line.push('\n');
          }
        }
        push_value(line, value, plan.decimals);
      }
    }
  }

  if let Some(strings) = strings.as_mut() {
    for line in &mut *strings {
      line.push(']');
    }
  }

  Ok(DataMatrix::new(GroupBy::ByParam, events, parameters, numbers, strings))
}

/// Render one value. Non-finite floats are spelled `NaN`, `Infinity` and
/// `-Infinity` at any precision.
fn push_value(out: &mut String, value: f64, decimals: Option<usize>) {
  if value.is_nan() {
    out.push_str("NaN");
    return;
  }
  if value.is_infinite() {
    out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
    return;
  }
  // Writing into a String cannot fail.
  let _ = match decimals {
    Some(precision) => write!(out, "{value:.precision$}"),
    None => write!(out, "{value}"),
  };
}
