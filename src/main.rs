use gain_tuner::control::model::StateSpaceModel;
use gain_tuner::control::plant::dc_motor;
use gain_tuner::control::simulator::compute_step_response;
use gain_tuner::plot::{draw_response, EigenvalueMap};
use gain_tuner::tuner::classifier::StabilityReport;
use gain_tuner::tuner::coordinator::{LogRenderer, StabilityRenderer};
use gain_tuner::tuner::session::TuningSession;
use gain_tuner::TunerConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TunerConfig::default();
    let plant = dc_motor::Model::new(dc_motor::Parameters::default(), config.sampling_frequency)?;
    let model = StateSpaceModel::from_plant(&plant)?;

    let mut logger = LogRenderer;
    let mut eigen_map = EigenvalueMap::new("eigenvalues.svg");
    let renderer = move |report: &StabilityReport| {
        logger.render(report);
        eigen_map.render(report);
    };

    let mut session = TuningSession::new(model, &config, renderer)?;
    session.notify();

    // Drag the current feedback slider across its range
    for db in [-36.0, -12.0, 0.0, 12.0, 24.0, 36.0] {
        let verdict = session.set_magnitude_db(0, 1, db)?;
        log::info!("F[0, 1] at {db:+.1} dB: {verdict:?}");
    }

    // Positive feedback on the current loop
    let verdict = session.set_sign(0, 1, true)?;
    log::info!("F[0, 1] inverted: {verdict:?}");

    let verdict = session.set_sign(0, 1, false)?;
    log::info!("F[0, 1] restored: {verdict:?}");

    let gain = session.export_gain();
    log::info!("final gain: {gain}");

    let n_samples = (0.05 * config.sampling_frequency) as usize;
    let response = compute_step_response(session.model(), n_samples, 1.0, 0)?;
    draw_response("step_response.svg", "Closed-loop speed, unit step", &response)?;

    Ok(())
}
