/// Convert a raw bytesize into a human readable string, e.g. 4_248_578 returns 4.25 MB
pub fn human_readable_bytesize(num: u64) -> String {
  const UNITS : [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
  const DELIMITER : f64 = 1000_f64;

  let num = num as f64;
  if num < DELIMITER {
    return format!("{:.2} {}", num, UNITS[0]);
  }
  let exponent = ((num.ln() / DELIMITER.ln()).floor() as usize).min(UNITS.len() - 1);
  format!("{:.2} {}", num / DELIMITER.powi(exponent as i32), UNITS[exponent])
}
