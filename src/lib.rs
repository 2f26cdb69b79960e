use chrono::prelude::*;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
pub mod plot;

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

pub const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The four lifts plotted when no explicit selection is given.
pub const DEFAULT_EXERCISES: [&str; 4] = [
    "Bench Press (Barbell)",
    "Squat (Barbell)",
    "Overhead Press (Barbell)",
    "Sumo Deadlift (Barbell)",
];

/// Estimated one-rep max with the Epley formula, weight w for r reps.
/// 0 reps carry no load estimate and a single rep already is the max.
/// Negative inputs are not validated.
pub fn epley_1rm(w: f64, r: u32) -> f64 {
    match r {
        0 => 0.,
        1 => w,
        _ => w * (1. + r as f64 / 30.),
    }
}

/// The main struct for the raw set log, one entry per logged set
#[derive(Debug, Clone)]
pub struct WorkoutLog {
    pub date: Vec<NaiveDate>,
    pub exercise: Vec<String>,
    pub weight: Vec<f64>,
    pub reps: Vec<u32>,
}

impl WorkoutLog {
    pub fn new(capacity: usize) -> WorkoutLog {
        let date: Vec<NaiveDate> = Vec::with_capacity(capacity);
        let exercise: Vec<String> = Vec::with_capacity(capacity);
        let weight: Vec<f64> = Vec::with_capacity(capacity);
        let reps: Vec<u32> = Vec::with_capacity(capacity);
        let log: WorkoutLog = WorkoutLog {
            date,
            exercise,
            weight,
            reps,
        };
        log
    }

    /// Init a WorkoutLog from a semicolon-separated csv,
    /// resolving the column positions from the header row
    /// (Date, Exercise Name, Weight, Reps; extra columns are ignored).
    /// Rows with unparseable weight or reps are reported and skipped,
    /// but panic for date errors and missing header columns.
    pub fn from_csv(fin: PathBuf) -> WorkoutLog {
        let file = File::open(fin).unwrap();
        let buf = BufReader::new(file);
        let mut lines = buf.lines();
        let header = match lines.next() {
            Some(h) => h.unwrap(),
            None => panic!("csv file is empty, no header row"),
        };
        let icol_date = find_column(&header, "Date");
        let icol_exercise = find_column(&header, "Exercise Name");
        let icol_weight = find_column(&header, "Weight");
        let icol_reps = find_column(&header, "Reps");
        let ncol_needed = 1 + *[icol_date, icol_exercise, icol_weight, icol_reps]
            .iter()
            .max()
            .unwrap();
        let mut log = WorkoutLog::new(10000 as usize);
        for l in lines {
            let l_unwrap = match l {
                Ok(l_ok) => l_ok,
                Err(l_err) => {
                    println!("Err, could not read/unwrap line {}", l_err);
                    continue;
                }
            };
            let fields: Vec<&str> = l_unwrap.split(';').collect();
            if fields.len() < ncol_needed {
                println!("skipping row with too few columns: {}", l_unwrap);
                continue;
            }
            let weight: f64 = match fields[icol_weight].parse() {
                Ok(w) => w,
                _ => {
                    println!("skipping set with invalid weight: {}", l_unwrap);
                    continue;
                }
            };
            let reps: u32 = match fields[icol_reps].parse() {
                Ok(r) => r,
                _ => {
                    println!("skipping set with invalid reps: {}", l_unwrap);
                    continue;
                }
            };
            log.date.push(parse_day(fields[icol_date]));
            log.exercise.push(fields[icol_exercise].to_string());
            log.weight.push(weight);
            log.reps.push(reps);
        }
        log
    }

    /// distinct exercise names with their set counts,
    /// most frequent first, ties broken by name for a stable listing
    pub fn exercises_by_frequency(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for name in self.exercise.iter() {
            *counts.entry(name).or_insert(0) += 1;
        }
        let mut by_frequency: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        by_frequency.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        by_frequency
    }

    /// collapses the sets of one exercise into per-day summaries:
    /// the maximum Epley estimate and the summed weight x reps.
    /// Days without sets for the exercise are left absent, no zero-filling;
    /// max and sum make the result independent of the record order.
    pub fn daily_progress(&self, exercise: &str) -> DailyProgress {
        let mut est_1rm_by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut volume_by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for i in 0..self.date.len() {
            if self.exercise[i] != exercise {
                continue;
            }
            let day = self.date[i];
            let est = epley_1rm(self.weight[i], self.reps[i]);
            let best = est_1rm_by_date.entry(day).or_insert(est);
            if est > *best {
                *best = est;
            }
            *volume_by_date.entry(day).or_insert(0.) += self.weight[i] * self.reps[i] as f64;
        }
        let mut daily = DailyProgress::new(est_1rm_by_date.len());
        for (day, est) in est_1rm_by_date {
            daily.date.push(day);
            daily.est_1rm.push(est);
            daily.volume.push(volume_by_date[&day]);
        }
        daily
    }
}

/// Daily summaries for one exercise, ordered by ascending date
#[derive(Debug, Clone)]
pub struct DailyProgress {
    pub date: Vec<NaiveDate>,
    pub est_1rm: Vec<f64>,
    pub volume: Vec<f64>,
}

impl DailyProgress {
    pub fn new(capacity: usize) -> DailyProgress {
        let date: Vec<NaiveDate> = Vec::with_capacity(capacity);
        let est_1rm: Vec<f64> = Vec::with_capacity(capacity);
        let volume: Vec<f64> = Vec::with_capacity(capacity);
        let daily: DailyProgress = DailyProgress {
            date,
            est_1rm,
            volume,
        };
        daily
    }

    /// writes the date, estimated 1RM and total volume columns as a csv
    pub fn to_csv(&self, fout: PathBuf) {
        let file = File::create(fout).unwrap();
        let mut buf = BufWriter::new(file);
        buf.write_all("date,est_1rm_kg,total_volume_kg\n".as_bytes())
            .unwrap();
        for i in 0..self.date.len() {
            buf.write_all(
                format!("{},{},{}\n", self.date[i], self.est_1rm[i], self.volume[i]).as_bytes(),
            )
            .unwrap();
        }
    }

    /// plots the two daily series to png as stacked scatter subplots,
    /// estimated 1RM on top and total volume below, markers only
    pub fn plot_datetime(
        &self,
        title: &str,
        fout: PathBuf,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (xmindt, xmaxdt): (NaiveDate, NaiveDate) = min_and_max(&self.date[..]);
        let xspan: chrono::Duration = xmaxdt - xmindt;
        let xmargin = std::cmp::max(xspan / 20, chrono::Duration::days(1));
        let xmin = xmindt - xmargin;
        let xmax = xmaxdt + xmargin;
        let xfmt = suitable_xfmt(xspan);
        let root = BitMapBackend::new(&fout, (1100, 900)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled(title, ("sans-serif", 32))?;
        let panels = root.split_evenly((2, 1));
        let series: [(&[f64], &str, &RGBColor); 2] = [
            (&self.est_1rm[..], "estimated 1RM [kg]", &BLUE),
            (&self.volume[..], "total volume [kg]", &RED),
        ];
        for (panel, &(values, ydesc, color)) in panels.iter().zip(series.iter()) {
            let (ymin, ymax) = min_and_max(values);
            let mut ypad = (ymax - ymin) / 10f64;
            if ypad == 0f64 {
                ypad = 1f64;
            }
            let ymin = ymin - ypad;
            let ymax = ymax + ypad;
            let mut chart = ChartBuilder::on(panel)
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(90)
                .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
            chart
                .configure_mesh()
                .light_line_style(&TRANSPARENT)
                .bold_line_style(RGBColor(150, 150, 150).stroke_width(1))
                .set_all_tick_mark_size(2)
                .label_style(("sans-serif", 18))
                .y_desc(ydesc)
                .x_labels(14) // max number of labels
                .x_label_formatter(&|x: &NaiveDate| x.format(xfmt).to_string())
                .y_label_formatter(&|y: &f64| format!("{:5}", y))
                .x_desc(format!("date [{}]", xfmt.replace("%", "")))
                .draw()?;
            let points = self
                .date
                .iter()
                .zip(values.iter())
                .map(|(&x, &y)| Circle::new((x, y), 4, color.mix(0.5).filled()));
            chart.draw_series(points)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for DailyProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "date, est 1RM [kg], total volume [kg]\n")?;
        for i in 0..self.date.len() {
            write!(
                f,
                "{},{},{}\n",
                self.date[i], self.est_1rm[i], self.volume[i]
            )?
        }
        Ok(())
    }
}

/// resolves the selection into exercise names:
/// indices into the frequency-ordered list when given,
/// the four default barbell lifts otherwise.
/// Panics for indices outside the discovered range, before any plotting.
pub fn select_exercises(
    by_frequency: &[(String, usize)],
    indices: Option<&[usize]>,
) -> Vec<String> {
    match indices {
        Some(idx) => idx
            .iter()
            .map(|&i| {
                if i >= by_frequency.len() {
                    panic!(
                        "exercise index {} is out of range, found {} exercises",
                        i,
                        by_frequency.len()
                    );
                }
                by_frequency[i].0.clone()
            })
            .collect(),
        None => DEFAULT_EXERCISES.iter().map(|s| s.to_string()).collect(),
    }
}

/// parses the day from either a datetime or a bare date field
pub fn parse_day(s: &str) -> NaiveDate {
    match NaiveDateTime::parse_from_str(s, DT_FORMAT) {
        Ok(dt) => dt.date(),
        Err(_) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
            Ok(d) => d,
            Err(e) => panic!("could not parse date '{}': {}", s, e),
        },
    }
}

fn find_column(header: &str, name: &str) -> usize {
    match header.split(';').position(|c| c.trim() == name) {
        Some(i) => i,
        None => panic!("column '{}' not found in header '{}'", name, header),
    }
}

/// maps an exercise name to a filename-safe stem,
/// e.g. "Bench Press (Barbell)" -> "Bench_Press_Barbell"
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> (T, T) {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => panic!("could not iterate over slice"),
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    return (min, max);
}

pub fn suitable_xfmt(d: chrono::Duration) -> &'static str {
    let xfmt = if d > chrono::Duration::weeks(52) {
        "%y-%m"
    } else if d > chrono::Duration::weeks(8) {
        "%y-%m-%d"
    } else {
        "%m-%d"
    };
    return xfmt;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn log_from_rows(rows: &[(&str, &str, f64, u32)]) -> WorkoutLog {
        let mut log = WorkoutLog::new(rows.len());
        for (d, e, w, r) in rows.iter() {
            log.date.push(day(d));
            log.exercise.push(e.to_string());
            log.weight.push(*w);
            log.reps.push(*r);
        }
        log
    }

    fn sample_rows() -> Vec<(&'static str, &'static str, f64, u32)> {
        vec![
            ("2021-03-01", "Squat (Barbell)", 100., 5),
            ("2021-03-01", "Squat (Barbell)", 120., 3),
            ("2021-03-01", "Bench Press (Barbell)", 80., 5),
            ("2021-03-03", "Squat (Barbell)", 110., 2),
            ("2021-03-03", "Bench Press (Barbell)", 82.5, 3),
            ("2021-03-03", "Bench Press (Barbell)", 85., 1),
            ("2021-03-05", "Overhead Press (Barbell)", 50., 8),
        ]
    }

    #[test]
    fn epley_no_reps_carries_no_load() {
        assert_eq!(epley_1rm(100., 0), 0.);
        assert_eq!(epley_1rm(0., 0), 0.);
    }

    #[test]
    fn epley_single_rep_is_already_the_max() {
        assert_eq!(epley_1rm(100., 1), 100.);
        assert_eq!(epley_1rm(57.5, 1), 57.5);
    }

    #[test]
    fn epley_extrapolates_above_one_rep() {
        assert!((epley_1rm(100., 5) - 116.66666666666667).abs() < 1e-9);
        assert!((epley_1rm(120., 3) - 132.).abs() < 1e-9);
    }

    #[test]
    fn daily_progress_takes_max_estimate_and_sums_volume() {
        let log = log_from_rows(&sample_rows());
        let daily = log.daily_progress("Squat (Barbell)");
        assert_eq!(daily.date, vec![day("2021-03-01"), day("2021-03-03")]);
        assert!((daily.est_1rm[0] - 132.).abs() < 1e-9);
        assert!((daily.volume[0] - 860.).abs() < 1e-9);
        assert!((daily.est_1rm[1] - 110. * (1. + 2. / 30.)).abs() < 1e-9);
        assert!((daily.volume[1] - 220.).abs() < 1e-9);
    }

    #[test]
    fn daily_progress_is_order_independent() {
        let mut rows = sample_rows();
        let forward = log_from_rows(&rows).daily_progress("Bench Press (Barbell)");
        rows.reverse();
        let backward = log_from_rows(&rows).daily_progress("Bench Press (Barbell)");
        assert_eq!(forward.date, backward.date);
        assert_eq!(forward.est_1rm, backward.est_1rm);
        assert_eq!(forward.volume, backward.volume);
    }

    #[test]
    fn daily_progress_leaves_missing_days_absent() {
        let log = log_from_rows(&sample_rows());
        let daily = log.daily_progress("Overhead Press (Barbell)");
        assert_eq!(daily.date, vec![day("2021-03-05")]);
        let none = log.daily_progress("Deadlift (Barbell)");
        assert!(none.date.is_empty());
        assert!(none.est_1rm.is_empty());
        assert!(none.volume.is_empty());
    }

    #[test]
    fn exercises_ordered_by_count_then_name() {
        let log = log_from_rows(&sample_rows());
        let by_frequency = log.exercises_by_frequency();
        assert_eq!(
            by_frequency,
            vec![
                ("Bench Press (Barbell)".to_string(), 3),
                ("Squat (Barbell)".to_string(), 3),
                ("Overhead Press (Barbell)".to_string(), 1),
            ]
        );
    }

    #[test]
    fn select_by_index_follows_the_frequency_listing() {
        let log = log_from_rows(&sample_rows());
        let by_frequency = log.exercises_by_frequency();
        let selected = select_exercises(&by_frequency, Some(&[2, 0]));
        assert_eq!(
            selected,
            vec!["Overhead Press (Barbell)", "Bench Press (Barbell)"]
        );
    }

    #[test]
    fn select_without_indices_falls_back_to_the_four_lifts() {
        let selected = select_exercises(&[], None);
        assert_eq!(selected, DEFAULT_EXERCISES.to_vec());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn select_past_the_discovered_exercises_panics() {
        let log = log_from_rows(&sample_rows());
        let by_frequency = log.exercises_by_frequency();
        select_exercises(&by_frequency, Some(&[3]));
    }

    #[test]
    fn parse_day_truncates_datetimes_to_the_day() {
        assert_eq!(parse_day("2021-03-01 17:30:00"), day("2021-03-01"));
        assert_eq!(parse_day("2021-03-01"), day("2021-03-01"));
    }

    #[test]
    fn from_csv_resolves_columns_and_skips_bad_rows() {
        let mut path = std::env::temp_dir();
        path.push("workout_progress_test_log.csv");
        std::fs::write(
            &path,
            "Workout Name;Date;Exercise Name;Weight;Reps;Notes\n\
             Push;2021-03-01 17:30:00;Bench Press (Barbell);80;5;\n\
             Push;2021-03-01 17:35:00;Bench Press (Barbell);;5;\n\
             Legs;2021-03-02;Squat (Barbell);100;5;pr\n",
        )
        .unwrap();
        let log = WorkoutLog::from_csv(path.clone());
        std::fs::remove_file(path).unwrap();
        assert_eq!(log.date.len(), 2);
        assert_eq!(
            log.exercise,
            vec!["Bench Press (Barbell)", "Squat (Barbell)"]
        );
        assert_eq!(log.weight, vec![80., 100.]);
        assert_eq!(log.reps, vec![5, 5]);
        assert_eq!(log.date[0], day("2021-03-01"));
        assert_eq!(log.date[1], day("2021-03-02"));
    }

    #[test]
    fn filename_stems_keep_only_alphanumerics() {
        assert_eq!(
            sanitize_filename("Bench Press (Barbell)"),
            "Bench_Press_Barbell"
        );
        assert_eq!(sanitize_filename("Squat"), "Squat");
    }

    #[test]
    fn xfmt_matches_the_date_span() {
        assert_eq!(suitable_xfmt(chrono::Duration::weeks(80)), "%y-%m");
        assert_eq!(suitable_xfmt(chrono::Duration::weeks(20)), "%y-%m-%d");
        assert_eq!(suitable_xfmt(chrono::Duration::days(10)), "%m-%d");
    }
}
