use workout_progress::plot::parse_cli;
use workout_progress::{sanitize_filename, select_exercises, WorkoutLog};

fn main() {
    let (csvin, outdir, indices, list) = parse_cli();
    println!("read workout log from {}", csvin.to_str().unwrap());
    let log = WorkoutLog::from_csv(csvin.clone());
    let by_frequency = log.exercises_by_frequency();
    if list {
        println!("{:>5} {:>5} exercise", "index", "sets");
        for (i, (name, count)) in by_frequency.iter().enumerate() {
            println!("{:>5} {:>5} {}", i, count, name);
        }
        return;
    }
    let selected = select_exercises(&by_frequency, indices.as_deref());
    std::fs::create_dir_all(&outdir).unwrap();
    let stem = csvin.file_stem().unwrap().to_str().unwrap();
    for name in selected {
        let daily = log.daily_progress(&name);
        if daily.date.is_empty() {
            println!("no sets found for {}, skipping", name);
            continue;
        }
        let fout = outdir.join(format!("{}_{}.png", sanitize_filename(&name), stem));
        println!("plot {} to {}", name, fout.to_str().unwrap());
        daily.plot_datetime(&name, fout).unwrap();
    }
}
