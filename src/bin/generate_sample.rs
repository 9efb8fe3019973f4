use std::sync::Arc;

use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One synthetic survey: where its stations fall and what they carry.
struct Survey {
    project: &'static str,
    prefix: &'static str,
    platform: &'static str,
    instruments: &'static [&'static str],
    lat: (f64, f64),
    lon: (f64, f64),
    stations: usize,
}

const SURVEYS: [Survey; 4] = [
    Survey {
        project: "Integrated Ecosystem Programme: Southern Benguela",
        prefix: "IEP-SB",
        platform: "RV Algoa",
        instruments: &["CTD", "Niskin Bottle", "Bongo", "TSG", "ADCP"],
        lat: (-35.0, -32.0),
        lon: (17.0, 20.0),
        stations: 30,
    },
    Survey {
        project: "Long-term monitoring of nearshore temperatures around Southern Africa",
        prefix: "UTR",
        platform: "Mooring",
        instruments: &["UTR"],
        lat: (-34.5, -29.0),
        lon: (16.5, 31.5),
        stations: 20,
    },
    Survey {
        project: "West Coast Cetacean Distribution and Abundance Survey",
        prefix: "WCC",
        platform: "RV Algoa",
        instruments: &["CTD", "TSG"],
        lat: (-34.0, -29.5),
        lon: (15.5, 18.0),
        stations: 25,
    },
    Survey {
        project: "South Atlantic Meridional Overturning Circulation Basin-wide Array",
        prefix: "SAMBA",
        platform: "SA Agulhas II",
        instruments: &["CTD", "ADCP", "Niskin Bottle", "TSG"],
        lat: (-34.6, -34.4),
        lon: (-5.0, 17.5),
        stations: 15,
    },
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut projects: Vec<&str> = Vec::new();
    let mut stations: Vec<String> = Vec::new();
    let mut platforms: Vec<&str> = Vec::new();
    let mut instruments: Vec<String> = Vec::new();
    let mut lats: Vec<f64> = Vec::new();
    let mut lons: Vec<f64> = Vec::new();

    for survey in &SURVEYS {
        for n in 1..=survey.stations {
            let mut deployed: Vec<&str> = (0..=survey.instruments.len().min(2))
                .map(|_| rng.pick(survey.instruments))
                .collect();
            deployed.sort_unstable();
            deployed.dedup();

            projects.push(survey.project);
            stations.push(format!("{}-{n:02}", survey.prefix));
            platforms.push(survey.platform);
            instruments.push(deployed.join(", "));
            lats.push((rng.uniform(survey.lat.0, survey.lat.1) * 1000.0).round() / 1000.0);
            lons.push((rng.uniform(survey.lon.0, survey.lon.1) * 1000.0).round() / 1000.0);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Project_Name", DataType::Utf8, false),
        Field::new("Station", DataType::Utf8, false),
        Field::new("Platform", DataType::Utf8, false),
        Field::new("Instrument_Type", DataType::Utf8, false),
        Field::new("Lat", DataType::Float64, false),
        Field::new("Lon", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(projects.clone())),
            Arc::new(StringArray::from(
                stations.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(StringArray::from(platforms.clone())),
            Arc::new(StringArray::from(
                instruments.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(lats.clone())),
            Arc::new(Float64Array::from(lons.clone())),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_stations.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Write CSV with the same rows
    let csv_path = "sample_stations.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    csv_writer
        .write_record(["Project_Name", "Station", "Platform", "Instrument_Type", "Lat", "Lon"])
        .expect("Failed to write CSV header");
    for i in 0..projects.len() {
        csv_writer
            .write_record([
                projects[i],
                stations[i].as_str(),
                platforms[i],
                instruments[i].as_str(),
                lats[i].to_string().as_str(),
                lons[i].to_string().as_str(),
            ])
            .expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV");

    match pretty_format_batches(&[batch.slice(0, 5)]) {
        Ok(preview) => println!("{preview}"),
        Err(e) => eprintln!("Preview unavailable: {e}"),
    }
    println!(
        "Wrote {} stations across {} projects to {parquet_path} and {csv_path}",
        projects.len(),
        SURVEYS.len()
    );
}
