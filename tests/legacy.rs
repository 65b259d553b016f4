use std::io::Write;

use chrono::NaiveDate;
use recipe_manager::{
    actions::{connect_in_memory, get_recipe_details, list_ingredients, search_by_tag},
    legacy::{import_csv, import_csv_file},
    Error,
};

const RECIPES_CSV: &str = "\
id,nombre,ingredientes,cantidades,preparacion,tiempo de preparacion,tiempo de coccion,creado,imagen,etiquetas,favorito
1,Tortilla,\"huevo,papa\",\"4 unidad,2 unidad\",\"Batir,Freir\",15 min,25 min,18:05 21-03-2023,None,\"Facil,Cena\",True
2,Papas fritas,\"papa,aceite\",\"3 unidad,100 ml\",\"Cortar,Freir\",10 min,15 min,09:30 02-04-2023,'images\\papas.jpg',Facil,False
";

#[tokio::test]
async fn legacy_rows_become_normalized_recipes() {
    let pool = connect_in_memory().await.unwrap();
    let ids = import_csv(RECIPES_CSV.as_bytes(), &pool).await.unwrap();
    assert_eq!(ids.len(), 2);

    let tortilla = get_recipe_details(ids[0], &pool).await.unwrap().unwrap();
    assert_eq!(tortilla.recipe.name, "Tortilla");
    assert_eq!(tortilla.recipe.preparation_time, 15);
    assert_eq!(tortilla.recipe.cooking_time, 25);
    assert!(tortilla.recipe.favorite);
    assert_eq!(tortilla.recipe.image, None);
    assert_eq!(
        tortilla.recipe.created_at,
        NaiveDate::from_ymd_opt(2023, 3, 21)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap()
    );
    assert_eq!(tortilla.ingredient_summary(), "huevo (4 unidad),papa (2 unidad)");
    let steps: Vec<&str> = tortilla.steps.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(steps, vec!["Batir", "Freir"]);

    let fries = get_recipe_details(ids[1], &pool).await.unwrap().unwrap();
    assert!(!fries.recipe.favorite);
    assert_eq!(fries.recipe.image.as_deref(), Some("images/papas.jpg"));

    // "papa" is shared by both rows and stored once.
    assert_eq!(list_ingredients(&pool).await.unwrap().len(), 3);
    assert_eq!(search_by_tag("Facil", &pool).await.unwrap().len(), 2);
    assert_eq!(search_by_tag("Cena", &pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn bad_row_is_reported_by_number() {
    let pool = connect_in_memory().await.unwrap();
    let csv = "\
nombre,ingredientes,cantidades,preparacion,tiempo de preparacion,tiempo de coccion
Arroz,arroz,200 g,Hervir,5 min,20 min
Sopa,\"agua,sal\",1 l,Hervir,cinco,10 min
";

    match import_csv(csv.as_bytes(), &pool).await {
        Err(Error::InvalidRequest(message)) => assert!(message.starts_with("row 2:")),
        other => panic!("expected an invalid request, got {other:?}"),
    }
}

#[tokio::test]
async fn imports_from_a_file_on_disk() {
    let pool = connect_in_memory().await.unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RECIPES_CSV.as_bytes()).unwrap();

    let ids = import_csv_file(file.path(), &pool).await.unwrap();
    assert_eq!(ids.len(), 2);

    let missing = import_csv_file(std::path::Path::new("does/not/exist.csv"), &pool).await;
    assert!(matches!(missing, Err(Error::Io(_))));
}
