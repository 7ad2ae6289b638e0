// Frenet optimal trajectory planning demo
//
// Replans in a closed loop along a curvy reference lane while avoiding
// parked obstacles, then saves the driven path as an SVG plot.

use std::cell::RefCell;
use std::rc::Rc;

use gnuplot::{AxesCommon, Caption, Color, Figure, PointSize, PointSymbol};

use frenet_planner::{FrenetPlanner, FrenetState, Lane, Obstacle, PlannerConfig, StatsCollector};

fn main() {
    println!("Frenet Optimal Trajectory demo start!");

    // Way points
    let lane = Lane::from_xy(
        &[0.0, 10.0, 20.5, 35.0, 70.5],
        &[0.0, -6.0, 5.0, 6.5, 0.0],
    );

    // Parked obstacles near the reference
    let obstacles = vec![
        Obstacle::static_at(20.0, 10.0, 0.0, 2.0, 2.0),
        Obstacle::static_at(30.0, 6.0, 0.0, 2.0, 2.0),
        Obstacle::static_at(35.0, 8.0, 0.0, 2.0, 2.0),
        Obstacle::static_at(50.0, 3.0, 0.0, 2.0, 2.0),
    ];

    let config = PlannerConfig {
        num_width: 7,
        num_speed: 5,
        num_t: 3,
        lowest_speed: 10.0 / 3.6,
        highest_speed: 30.0 / 3.6,
        min_t: 4.0,
        max_t: 5.0,
        tick_t: 0.2,
        vehicle_length: 3.0,
        vehicle_width: 1.5,
        ..PlannerConfig::default()
    };

    let mut planner = FrenetPlanner::new(config).unwrap();
    let stats = Rc::new(RefCell::new(StatsCollector::new()));
    planner.set_observer(Box::new(Rc::clone(&stats)));

    let (ref_path, spline) = planner.generate_reference_curve(&lane).unwrap();

    // Initial state: offset 2 m left of the centerline at low speed
    let mut start = FrenetState::new(0.0, 10.0 / 3.6, 0.0, 2.0, 0.0, 0.0, 0.0);
    let mut current_speed = 10.0 / 3.6;

    let mut driven = Lane::new();
    let mut last_plan: Vec<(f64, f64)> = Vec::new();

    for step in 0..500 {
        let result = planner
            .plan(&lane, &start, 0, 7.0, 7.0, current_speed, &obstacles, true, false)
            .unwrap();

        let traj = match result {
            Some(traj) => traj,
            None => {
                println!("step {}: no valid trajectory found", step);
                break;
            }
        };

        if traj.len() > 1 {
            start = FrenetState::new(
                traj.s[1], traj.s_d[1], traj.s_dd[1],
                traj.d[1], traj.d_d[1], traj.d_dd[1],
                0.0,
            );
            current_speed = traj.s_d[1];
        }

        if !traj.x.is_empty() {
            driven.push((traj.x[0], traj.y[0]).into());
        }
        last_plan = traj.x.iter().cloned().zip(traj.y.iter().cloned()).collect();

        if spline.s_max() - start.s < 3.0 {
            println!("Goal reached after {} steps!", step + 1);
            break;
        }
    }

    print!("{}", stats.borrow());

    // Save final plot
    std::fs::create_dir_all("img").unwrap();

    let ob_x: Vec<f64> = obstacles.iter().map(|o| o.x).collect();
    let ob_y: Vec<f64> = obstacles.iter().map(|o| o.y).collect();
    let plan_x: Vec<f64> = last_plan.iter().map(|p| p.0).collect();
    let plan_y: Vec<f64> = last_plan.iter().map(|p| p.1).collect();

    let mut fig = Figure::new();
    fig.axes2d()
        .set_title("Frenet Optimal Trajectory", &[])
        .set_x_label("x [m]", &[])
        .set_y_label("y [m]", &[])
        .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
        .lines(&ref_path.x, &ref_path.y, &[Caption("Reference"), Color("gray")])
        .points(&ob_x, &ob_y, &[Caption("Obstacles"), Color("black"), PointSymbol('O'), PointSize(2.0)])
        .lines(&plan_x, &plan_y, &[Caption("Last plan"), Color("green")])
        .lines(&driven.x_coords(), &driven.y_coords(), &[Caption("Driven"), Color("red")]);

    fig.save_to_svg("./img/frenet_demo.svg", 640, 480).unwrap();
    println!("Plot saved to ./img/frenet_demo.svg");
}
