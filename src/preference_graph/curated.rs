//! Built-in art-historical relation graph and cold-start table.

use super::graph::{ArtistNode, GenreNode, PreferenceGraph, SeedPreferences};

pub const CURATED_GRAPH_VERSION: u32 = 1;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn artist(movement: &str, related: &[&str], influenced_by: &[&str], influenced: &[&str]) -> ArtistNode {
    ArtistNode {
        movement: Some(movement.to_string()),
        related: strings(related),
        influenced_by: strings(influenced_by),
        influenced: strings(influenced),
    }
}

fn genre(subgenres: &[&str], related: &[&str]) -> GenreNode {
    GenreNode {
        subgenres: strings(subgenres),
        related: strings(related),
    }
}

fn seed(artists: &[&str], genres: &[&str], movements: &[&str]) -> SeedPreferences {
    SeedPreferences {
        artists: strings(artists),
        genres: strings(genres),
        movements: strings(movements),
    }
}

impl PreferenceGraph {
    pub fn curated() -> Self {
        let mut graph = PreferenceGraph {
            version: CURATED_GRAPH_VERSION,
            ..Default::default()
        };

        let artists = [
            (
                "monet",
                artist(
                    "impressionism",
                    &["renoir", "degas", "pissarro", "sisley", "caillebotte"],
                    &["manet", "boudin"],
                    &["signac", "seurat"],
                ),
            ),
            (
                "van-gogh",
                artist(
                    "post-impressionism",
                    &["gauguin", "cezanne", "toulouse-lautrec"],
                    &["millet", "daumier", "hiroshige"],
                    &["matisse", "vlaminck", "kirchner"],
                ),
            ),
            (
                "picasso",
                artist(
                    "cubism",
                    &["braque", "gris", "leger"],
                    &["cezanne", "gauguin", "african-art"],
                    &["duchamp", "de-kooning", "bacon"],
                ),
            ),
            (
                "rembrandt",
                artist(
                    "baroque",
                    &["vermeer", "hals", "jan-steen"],
                    &["caravaggio", "lastman"],
                    &["bol", "flinck", "hoogstraten"],
                ),
            ),
        ];
        graph
            .artists
            .extend(artists.into_iter().map(|(k, v)| (k.to_string(), v)));

        let genres = [
            (
                "figurative",
                genre(
                    &["portrait", "self-portrait", "group-portrait", "nude"],
                    &["genre-painting", "history-painting"],
                ),
            ),
            (
                "landscape",
                genre(
                    &["seascape", "cityscape", "pastoral", "wilderness"],
                    &["marine", "veduta", "topographical"],
                ),
            ),
            (
                "still-life",
                genre(
                    &["vanitas", "floral", "food", "trompe-loeil"],
                    &["interior", "botanical"],
                ),
            ),
            (
                "abstract",
                genre(
                    &["geometric", "lyrical", "color-field", "gestural"],
                    &["non-objective", "concrete"],
                ),
            ),
            (
                "religious",
                genre(
                    &["biblical", "mythological", "devotional", "icon"],
                    &["allegorical", "spiritual"],
                ),
            ),
        ];
        graph
            .genres
            .extend(genres.into_iter().map(|(k, v)| (k.to_string(), v)));

        let seeds = [
            (
                "LAEF",
                seed(
                    &["van-gogh", "turner", "blake", "redon", "moreau"],
                    &["dreamlike", "visionary", "emotional", "mystical"],
                    &["symbolism", "romanticism", "surrealism"],
                ),
            ),
            (
                "LAEC",
                seed(
                    &["monet", "degas", "cassatt", "sargent", "whistler"],
                    &["elegant", "refined", "atmospheric", "poetic"],
                    &["impressionism", "aestheticism", "tonalism"],
                ),
            ),
            (
                "LAMF",
                seed(
                    &["vermeer", "hammershoi", "hopper", "wyeth", "balthus"],
                    &["contemplative", "introspective", "mysterious", "psychological"],
                    &["realism", "magic-realism", "new-objectivity"],
                ),
            ),
            (
                "LAMC",
                seed(
                    &["chardin", "morandi", "cezanne", "braque", "klee"],
                    &["still-life", "meditative", "structured", "harmonious"],
                    &["post-impressionism", "cubism", "bauhaus"],
                ),
            ),
            (
                "LREF",
                seed(
                    &["velazquez", "manet", "courbet", "eakins", "lucian-freud"],
                    &["observational", "naturalistic", "psychological-realism"],
                    &["realism", "impressionism", "contemporary-realism"],
                ),
            ),
            (
                "LREC",
                seed(
                    &["renoir", "fragonard", "boucher", "gainsborough", "greuze"],
                    &["gentle", "delicate", "pastoral", "intimate"],
                    &["rococo", "english-romanticism", "genre-painting"],
                ),
            ),
            (
                "LRMF",
                seed(
                    &["caravaggio", "ribera", "goya", "bacon", "lucian-freud"],
                    &["dramatic", "intense", "psychological", "raw"],
                    &["baroque", "romanticism", "expressionism"],
                ),
            ),
            (
                "LRMC",
                seed(
                    &["durer", "van-eyck", "holbein", "ingres", "david"],
                    &["precise", "detailed", "technical", "classical"],
                    &["northern-renaissance", "neoclassicism", "academic-art"],
                ),
            ),
            (
                "SAEF",
                seed(
                    &["matisse", "chagall", "dufy", "delaunay", "kirchner"],
                    &["vibrant", "joyful", "colorful", "expressive"],
                    &["fauvism", "orphism", "expressionism"],
                ),
            ),
            (
                "SAEC",
                seed(
                    &["mondrian", "kandinsky", "malevich", "albers", "vasarely"],
                    &["geometric", "systematic", "harmonious", "rhythmic"],
                    &["de-stijl", "bauhaus", "constructivism", "op-art"],
                ),
            ),
            (
                "SAMF",
                seed(
                    &["basquiat", "haring", "koons", "murakami", "kaws"],
                    &["pop", "street-art", "contemporary", "communicative"],
                    &["neo-expressionism", "pop-art", "street-art"],
                ),
            ),
            (
                "SAMC",
                seed(
                    &["warhol", "lichtenstein", "rauschenberg", "johns", "hockney"],
                    &["pop-culture", "systematic", "cultural-commentary"],
                    &["pop-art", "neo-pop", "contemporary-art"],
                ),
            ),
            (
                "SREF",
                seed(
                    &["rockwell", "leyendecker", "parrish", "alma-tadema", "bouguereau"],
                    &["narrative", "sentimental", "accessible", "decorative"],
                    &["american-realism", "academic-art", "golden-age-illustration"],
                ),
            ),
            (
                "SREC",
                seed(
                    &["millais", "rossetti", "waterhouse", "burne-jones", "mucha"],
                    &["romantic", "narrative", "decorative", "symbolic"],
                    &["pre-raphaelite", "art-nouveau", "symbolism"],
                ),
            ),
            (
                "SRMF",
                seed(
                    &["rembrandt", "titian", "rubens", "velazquez", "poussin"],
                    &["masterful", "monumental", "narrative", "classical"],
                    &["baroque", "high-renaissance", "venetian-school"],
                ),
            ),
            (
                "SRMC",
                seed(
                    &["raphael", "leonardo", "michelangelo", "botticelli", "giotto"],
                    &["classical", "systematic", "educational", "ideal"],
                    &["high-renaissance", "early-renaissance", "mannerism"],
                ),
            ),
        ];
        graph
            .seeds
            .extend(seeds.into_iter().map(|(k, v)| (k.to_string(), v)));

        graph
            .seed_aliases
            .insert("collector-seed".to_string(), "LAMC".to_string());

        graph
    }
}
