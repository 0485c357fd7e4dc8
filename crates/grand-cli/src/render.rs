use anyhow::Result;
use grand_lib::plot::{Color as FigColor, Figure, PlotBackend, Series};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::path::{Path, PathBuf};

/// Draws figures to a PNG or SVG file chosen by the output extension.
pub struct FileBackend {
    path: PathBuf,
    size: (u32, u32),
}

impl FileBackend {
    pub fn new(path: &Path, size: (u32, u32)) -> Self {
        Self {
            path: path.to_path_buf(),
            size,
        }
    }

    fn is_svg(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }
}

impl PlotBackend for FileBackend {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        if self.is_svg() {
            draw_figure(SVGBackend::new(&self.path, self.size).into_drawing_area(), fig)
        } else {
            draw_figure(BitMapBackend::new(&self.path, self.size).into_drawing_area(), fig)
        }
    }
}

fn rgb(color: FigColor) -> RGBColor {
    let (r, g, b) = color.rgb();
    RGBColor(r, g, b)
}

fn draw_figure<DB>(root: DrawingArea<DB, Shift>, fig: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (x_min, x_max) = fig.x.range;
    let (y_min, y_max) = fig.y.range;
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 22),
        )
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
    chart
        .configure_mesh()
        .x_desc(fig.x.label.clone().unwrap_or_default())
        .y_desc(fig.y.label.clone().unwrap_or_default())
        .light_line_style(&WHITE.mix(0.7))
        .draw()?;

    for series in &fig.series {
        match series {
            Series::Band(band) => {
                let outline: Vec<(f64, f64)> =
                    band.outline().into_iter().map(|p| (p[0], p[1])).collect();
                let style = rgb(band.color).mix(band.opacity as f64).filled();
                chart.draw_series(std::iter::once(Polygon::new(outline, style)))?;
            }
            Series::Line(line) => {
                chart.draw_series(LineSeries::new(
                    line.points.iter().map(|p| (p[0], p[1])),
                    rgb(line.style.color).stroke_width(line.style.width.round().max(1.0) as u32),
                ))?;
            }
            Series::Marker(marker) => {
                let style =
                    rgb(marker.style.color).stroke_width(marker.style.width.max(1.0) as u32);
                let points = vec![(marker.x, marker.y_from), (marker.x, marker.y_to)];
                match marker.style.dash {
                    Some([dash, gap]) => {
                        chart.draw_series(DashedLineSeries::new(
                            points,
                            dash.max(1.0) as u32,
                            gap.max(1.0) as u32,
                            style,
                        ))?;
                    }
                    None => {
                        chart.draw_series(LineSeries::new(points, style))?;
                    }
                }
            }
        }
    }
    root.present()?;
    Ok(())
}
