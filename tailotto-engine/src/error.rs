use thiserror::Error;

/// Erreurs du moteur de recommandation.
///
/// Seules deux situations remontent à l'appelant : un historique
/// inexploitable (récupérable par repli uniforme) et une configuration
/// incohérente avec la forme de la table (fatale pour ce jeu uniquement).
/// L'épuisement du budget d'échantillonnage n'est pas une erreur : il se
/// résout en interne par le repli uniforme documenté.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("historique insuffisant : aucun tirage exploitable")]
    InsufficientData,

    #[error("configuration invalide : {0}")]
    Configuration(String),
}
