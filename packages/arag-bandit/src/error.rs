pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Arm {arm} has unsampleable Beta parameters: alpha={alpha}, beta={beta}.")]
	InvalidBeta { arm: String, alpha: f64, beta: f64 },
}
