extern crate plotters;

use plotters::prelude::*;

use crate::{float,Float};
use crate::experiment::ExperimentResults;

pub fn get_min_max(data_vectors: Vec<&Vec<Float>>) -> (Float,Float) {

    let mut min = float::MAX;
    let mut max = float::MIN;

    for data in data_vectors {
        for &v in data.iter() {
            if v < min {
                min = v;
            }

            if v > max {
                max = v;
            }
        }
    }

    if min > max {
        return (0.0, 1.0);
    }

    if (max-min) < 1e-5 {
        max = min + 1e-5;
    }

    (min,max)
}

fn angle_range(results: &ExperimentResults) -> (Float,Float) {
    let angles = results.series.iter().map(|s| s.results.iter().map(|r| r.angle_deg).collect::<Vec<Float>>()).collect::<Vec<Vec<Float>>>();
    get_min_max(angles.iter().collect())
}

/// Match percentage over the rotation angle, one line per detector
pub fn draw_match_percentage_graph(results: &ExperimentResults, output_folder: &str, file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (angle_min, angle_max) = angle_range(results);

    let path = format!("{}/{}",output_folder,file_name);
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .caption("Matched keypoints", ("sans-serif", 40))
        .build_cartesian_2d(angle_min..angle_max, 0.0..100.0)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("rotation [deg]")
        .y_desc("matched [%]")
        .draw()?;

    for (i, series) in results.series.iter().enumerate() {
        let color = Palette99::pick(i);
        chart.draw_series(
            LineSeries::new(
                series.results.iter().map(|r| (r.angle_deg, r.match_percentage)),
                &color,
            )
        )?.label(series.detector.as_str()).legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(i)));
    }

    chart.configure_series_labels().border_style(&BLACK).background_style(&WHITE.mix(0.8)).draw()?;
    root.present()?;

    Ok(())
}

/// Keypoint counts of the unrotated and the rotated image over the rotation angle, two lines per detector
pub fn draw_keypoint_count_graph(results: &ExperimentResults, output_folder: &str, file_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (angle_min, angle_max) = angle_range(results);
    let counts = results.series.iter()
        .map(|s| s.results.iter().flat_map(|r| vec![r.reference_count as Float, r.rotated_count as Float]).collect::<Vec<Float>>())
        .collect::<Vec<Vec<Float>>>();
    let (_, count_max) = get_min_max(counts.iter().collect());

    let path = format!("{}/{}",output_folder,file_name);
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(30)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .caption("Keypoint count", ("sans-serif", 40))
        .build_cartesian_2d(angle_min..angle_max, 0.0..count_max.max(1.0)*1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("rotation [deg]")
        .y_desc("keypoints")
        .draw()?;

    for (i, series) in results.series.iter().enumerate() {
        let reference_color = Palette99::pick(2*i);
        let rotated_color = Palette99::pick(2*i+1);

        chart.draw_series(
            LineSeries::new(
                series.results.iter().map(|r| (r.angle_deg, r.reference_count as Float)),
                &reference_color,
            )
        )?.label(format!("{} reference", series.detector)).legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(2*i)));

        chart.draw_series(
            LineSeries::new(
                series.results.iter().map(|r| (r.angle_deg, r.rotated_count as Float)),
                &rotated_color,
            )
        )?.label(format!("{} rotated", series.detector)).legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &Palette99::pick(2*i+1)));
    }

    chart.configure_series_labels().border_style(&BLACK).background_style(&WHITE.mix(0.8)).draw()?;
    root.present()?;

    Ok(())
}
